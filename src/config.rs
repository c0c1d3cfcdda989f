//! Service configuration, read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use axum::http::HeaderValue;

use crate::error::ConfigError;
use crate::pipeline::types::Priority;

/// Runtime configuration for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Location of the trained classifier artifact.
    pub model_path: PathBuf,
    /// Classes reported by `/health` while no model is loaded.
    pub default_classes: Vec<Priority>,
    /// `top_k` used when a request does not set one.
    pub default_top_k: usize,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<HeaderValue>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            model_path: PathBuf::from("training/model.json"),
            default_classes: Priority::ALL.to_vec(),
            default_top_k: 20,
            cors_origins: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Build configuration from `PRIORITY_*` environment variables.
    ///
    /// Unset variables keep their defaults; set but unparsable ones are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("PRIORITY_HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PRIORITY_PORT")?.unwrap_or(defaults.port);
        let model_path = lookup("PRIORITY_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_path);
        let default_top_k =
            parse_var(&lookup, "PRIORITY_TOP_K")?.unwrap_or(defaults.default_top_k);

        let default_classes = match lookup("PRIORITY_DEFAULT_CLASSES") {
            Some(raw) => split_list(&raw)
                .iter()
                .map(|label| {
                    label.parse::<Priority>().map_err(|e| ConfigError::InvalidValue {
                        key: "PRIORITY_DEFAULT_CLASSES".into(),
                        message: e,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => defaults.default_classes,
        };

        let cors_origins = match lookup("PRIORITY_CORS_ORIGINS") {
            Some(raw) => parse_origins(&raw)?,
            None => defaults.cors_origins,
        };

        Ok(Self {
            host,
            port,
            model_path,
            default_classes,
            default_top_k,
            cors_origins,
        })
    }

    /// Socket address to bind the listener to.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                key: "PRIORITY_HOST".into(),
                message: e.to_string(),
            })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Comma-separated origins such as `https://web.whatsapp.com`. A lone `*`
/// means any origin.
fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    let entries = split_list(raw);
    if entries.iter().any(|origin| origin == "*") {
        if entries.len() > 1 {
            return Err(ConfigError::InvalidValue {
                key: "PRIORITY_CORS_ORIGINS".into(),
                message: "`*` cannot be combined with explicit origins".into(),
            });
        }
        return Ok(Vec::new());
    }

    entries
        .iter()
        .map(|origin| {
            let invalid = |message: String| ConfigError::InvalidValue {
                key: "PRIORITY_CORS_ORIGINS".into(),
                message,
            };
            if !origin.contains("://") {
                return Err(invalid(format!("origin {origin:?} has no scheme")));
            }
            HeaderValue::from_str(origin)
                .map_err(|e| invalid(format!("origin {origin:?}: {e}")))
        })
        .collect()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
