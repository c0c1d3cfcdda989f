//! Offline tools: weak labeling, single-text prediction and model evaluation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use chat_priority::config::ServiceConfig;
use chat_priority::eval::{self, ClassificationReport, LabeledText, RawText};
use chat_priority::model::{self, ClassifierModel, weak_label::weak_label};

#[derive(Parser)]
#[command(name = "priority-tools")]
#[command(about = "Labeling and evaluation tools for the priority model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Label raw messages with the keyword heuristic (JSON lines with a `text` field).
    WeakLabel {
        #[arg(long, short, value_name = "PATH")]
        input: PathBuf,

        #[arg(long, short, value_name = "PATH")]
        output: PathBuf,
    },

    /// Report precision/recall of a model artifact on labeled data.
    Evaluate {
        /// Labeled JSON lines (`text`, `label`).
        #[arg(long, short, value_name = "PATH")]
        data: PathBuf,

        /// Model artifact (default: PRIORITY_MODEL_PATH or training/model.json).
        #[arg(long, short, value_name = "PATH")]
        model: Option<PathBuf>,
    },

    /// Print the predicted label and class probabilities for one text.
    Predict {
        text: String,

        /// Model artifact (default: PRIORITY_MODEL_PATH or training/model.json).
        #[arg(long, short, value_name = "PATH")]
        model: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    match Cli::parse().command {
        Commands::WeakLabel { input, output } => run_weak_label(input, output),
        Commands::Evaluate { data, model } => run_evaluate(data, model).await,
        Commands::Predict { text, model } => run_predict(text, model).await,
    }
}

fn run_weak_label(input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let raw: Vec<RawText> = eval::read_jsonl(&input)
        .with_context(|| format!("reading {}", input.display()))?;
    let labeled: Vec<LabeledText> = raw
        .into_iter()
        .map(|r| LabeledText {
            label: weak_label(&r.text),
            text: r.text,
        })
        .collect();
    eval::write_jsonl(&output, &labeled)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote {} labeled messages to {}", labeled.len(), output.display());
    Ok(())
}

async fn load_model(model_path: Option<PathBuf>) -> anyhow::Result<Arc<dyn ClassifierModel>> {
    let model_path = match model_path {
        Some(path) => path,
        None => ServiceConfig::from_env()?.model_path,
    };
    model::load_artifact(&model_path)
        .await
        .with_context(|| format!("loading {}", model_path.display()))
}

async fn run_predict(text: String, model_path: Option<PathBuf>) -> anyhow::Result<()> {
    let model = load_model(model_path).await?;
    print!("{}", eval::predict(model.as_ref(), &text)?);
    Ok(())
}

async fn run_evaluate(data: PathBuf, model_path: Option<PathBuf>) -> anyhow::Result<()> {
    let model = load_model(model_path).await?;

    let labeled: Vec<LabeledText> =
        eval::read_jsonl(&data).with_context(|| format!("reading {}", data.display()))?;

    let actual: Vec<_> = labeled.iter().map(|r| r.label).collect();
    let predicted = labeled
        .iter()
        .map(|r| eval::predict_label(model.as_ref(), &r.text))
        .collect::<Result<Vec<_>, _>>()?;

    print!("{}", ClassificationReport::compute(&actual, &predicted));
    Ok(())
}
