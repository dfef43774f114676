use anyhow::Context;
use clap::{Parser, Subcommand};
use intent_classifier::{
    api::{handlers::PredictIntentRequest, PREDICT_INTENT_PATH},
    config::Config,
    logging::init_tracing,
    ml::{ArtifactPaths, IntentModel, UnknownTextPolicy},
    pipeline::{evaluate, train, EvaluationOptions, TrainingOptions},
};
use reqwest::{Client, StatusCode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "intent-cli")]
#[command(about = "Train, evaluate and query the intent classifier", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML file layered over the built-in defaults
    #[arg(short, long, env = "CONFIG_PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit vectorizer and classifier on a corpus and save both
    Train {
        /// JSON array of {text, intent} records
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Directory receiving vectorizer.bin and intent_model.bin
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Optimizer iteration cap
        #[arg(short, long)]
        max_iterations: Option<u64>,

        /// L2 penalty strength
        #[arg(short, long)]
        alpha: Option<f64>,
    },

    /// Print a precision/recall/F1 report for saved artifacts
    Evaluate {
        /// Labeled JSON corpus to score against
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Directory holding the artifacts
        #[arg(short, long)]
        model_dir: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict the intent of a text with local artifacts
    Predict {
        #[arg(value_name = "TEXT")]
        text: String,

        /// Directory holding the artifacts
        #[arg(short, long)]
        model_dir: Option<PathBuf>,

        /// Fail instead of falling back when no term is known
        #[arg(long)]
        reject_unknown: bool,
    },

    /// Ask a running server for the intent of a text
    Query {
        #[arg(value_name = "TEXT")]
        text: String,

        #[arg(short, long, default_value = "http://localhost:8000")]
        endpoint: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config.observability);

    match cli.command {
        Commands::Train {
            data,
            out_dir,
            max_iterations,
            alpha,
        } => {
            let mut options = TrainingOptions::from_config(&config);
            if let Some(data) = data {
                options.data_path = data;
            }
            if let Some(dir) = out_dir {
                options.artifacts = ArtifactPaths::in_dir(dir);
            }
            if let Some(max_iterations) = max_iterations {
                options.classifier.max_iterations = max_iterations;
            }
            if let Some(alpha) = alpha {
                options.classifier.alpha = alpha;
            }

            let summary = train(&options).context("Training failed")?;

            println!("Model and vectorizer trained and saved");
            println!("  Samples:           {}", summary.n_samples);
            println!("  Features:          {}", summary.n_features);
            println!("  Intents:           {}", summary.intents.join(", "));
            println!("  Training accuracy: {:.2}%", summary.training_accuracy * 100.0);
            println!("  Vectorizer:        {}", summary.vectorizer_path.display());
            println!("  Classifier:        {}", summary.classifier_path.display());
        }

        Commands::Evaluate {
            data,
            model_dir,
            json,
        } => {
            let mut options = EvaluationOptions::from_config(&config);
            if let Some(data) = data {
                options.data_path = data;
            }
            if let Some(dir) = model_dir {
                options.artifacts = ArtifactPaths::in_dir(dir);
            }

            let report = evaluate(&options).context("Evaluation failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Model Evaluation Report:\n");
                print!("{}", report);
            }
        }

        Commands::Predict {
            text,
            model_dir,
            reject_unknown,
        } => {
            let paths = model_dir
                .map(ArtifactPaths::in_dir)
                .unwrap_or_else(|| config.artifact_paths());
            let policy = if reject_unknown {
                UnknownTextPolicy::Reject
            } else {
                config.serving.unknown_text_policy
            };

            let model = IntentModel::load(&paths, policy).context("Failed to load artifacts")?;
            let prediction = model.predict(&text)?;

            println!("{}", prediction.intent);
            println!("  confidence: {:.3}", prediction.confidence);
            if prediction.fallback {
                println!("  (no known terms; answered with the majority intent)");
            }
            for (intent, probability) in &prediction.probabilities {
                println!("  {:<20} {:.3}", intent, probability);
            }
        }

        Commands::Query { text, endpoint } => {
            let client = Client::new();
            let response = client
                .post(format!("{}{}", endpoint.trim_end_matches('/'), PREDICT_INTENT_PATH))
                .json(&PredictIntentRequest { text })
                .send()
                .await
                .with_context(|| format!("Failed to reach {}", endpoint))?;

            let status = response.status();
            let body = response.text().await?;
            println!("{}", render_response(status, &body)?);
        }
    }

    Ok(())
}

/// Pretty-print a server reply; a non-2xx status becomes an error carrying the body
fn render_response(status: StatusCode, body: &str) -> anyhow::Result<String> {
    let rendered = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => body.trim().to_string(),
    };

    if !status.is_success() {
        anyhow::bail!("Server responded with {}: {}", status, rendered);
    }

    Ok(rendered)
}
