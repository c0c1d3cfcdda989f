//! Chat message prioritization service.

pub mod api;
pub mod config;
pub mod error;
pub mod eval;
pub mod model;
pub mod pipeline;
