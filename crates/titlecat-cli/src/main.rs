//! `titlecat`: serve or query a document-title classifier.
//!
//! ```bash
//! titlecat serve --model-dir model/ --classifier model/classifier.json
//! titlecat predict "Quarterly Revenue Growth"
//! titlecat vectorize "the of and"
//! titlecat inspect
//! ```

mod display;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use titlecat_ai::{LanguageModel, Pipeline, Tokenizer, load_classifier};
use titlecat_server::ServerConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "titlecat", version, about = "Classify document titles into categories")]
struct Cli {
    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, env = "TITLECAT_LOG", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve POST /predict over HTTP
    Serve {
        #[command(flatten)]
        artifacts: ArtifactArgs,

        #[arg(long, env = "TITLECAT_BIND", default_value = "127.0.0.1:5000")]
        bind: SocketAddr,

        /// The single browser origin allowed to call the API
        #[arg(long, env = "TITLECAT_ALLOWED_ORIGIN", default_value = "http://localhost:5173")]
        allowed_origin: String,

        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,

        #[arg(long, default_value_t = 64 * 1024)]
        max_body_bytes: usize,
    },
    /// Predict the category of one title
    Predict {
        #[command(flatten)]
        artifacts: ArtifactArgs,

        title: String,
    },
    /// Show how a title is tokenized and filtered
    Vectorize {
        #[command(flatten)]
        artifacts: ArtifactArgs,

        title: String,
    },
    /// Describe the loaded artifacts
    Inspect {
        #[command(flatten)]
        artifacts: ArtifactArgs,
    },
}

#[derive(Args, Clone)]
struct ArtifactArgs {
    /// Directory holding vectors.txt and optionally stopwords.txt
    #[arg(long, env = "TITLECAT_MODEL_DIR", default_value = "model")]
    model_dir: PathBuf,

    /// Classifier artifact (.json, or .onnx with the onnx feature)
    #[arg(long, env = "TITLECAT_CLASSIFIER", default_value = "model/classifier.json")]
    classifier: PathBuf,
}

impl ArtifactArgs {
    fn load_model(&self) -> anyhow::Result<LanguageModel> {
        LanguageModel::load(&self.model_dir)
            .with_context(|| format!("loading language model from {}", self.model_dir.display()))
    }

    fn load_pipeline(&self) -> anyhow::Result<Pipeline> {
        let model = self.load_model()?;
        let classifier = load_classifier(&self.classifier)
            .with_context(|| format!("loading classifier {}", self.classifier.display()))?;
        Pipeline::new(Box::new(model), classifier).with_context(|| {
            format!(
                "{} is incompatible with {}",
                self.classifier.display(),
                self.model_dir.display()
            )
        })
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);
    tracing::debug!("titlecat v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve {
            artifacts,
            bind,
            allowed_origin,
            timeout_secs,
            max_body_bytes,
        } => {
            let pipeline = Arc::new(artifacts.load_pipeline()?);
            let config = ServerConfig {
                bind,
                allowed_origin,
                timeout_secs,
                max_body_bytes,
            };
            titlecat_server::serve(pipeline, config)
                .await
                .context("server failed")?;
        }
        Command::Predict { artifacts, title } => {
            let pipeline = artifacts.load_pipeline()?;
            let prediction = pipeline.predict(&title).context("prediction failed")?;
            println!("{}", prediction.label);
        }
        Command::Vectorize { artifacts, title } => {
            let model = artifacts.load_model()?;
            let tokens = model.tokenize(&title).context("tokenizing title")?;
            let vectorized =
                titlecat_ai::vectorize(&model, &title).context("vectorizing title")?;
            display::print_tokens(&tokens, &vectorized);
        }
        Command::Inspect { artifacts } => inspect(&artifacts)?,
    }

    Ok(())
}

fn inspect(artifacts: &ArtifactArgs) -> anyhow::Result<()> {
    let model = artifacts.load_model()?;
    let stats = display::ModelStats {
        model_dir: artifacts.model_dir.clone(),
        classifier: artifacts.classifier.clone(),
        dim: model.embeddings().dim(),
        vocab: model.embeddings().len(),
        stopwords: model.stopwords().len(),
    };
    let classifier = load_classifier(&artifacts.classifier)
        .with_context(|| format!("loading classifier {}", artifacts.classifier.display()))?;
    let pipeline = Pipeline::new(Box::new(model), classifier)
        .context("classifier is incompatible with the language model")?;
    display::print_inspect(&stats, &pipeline);
    Ok(())
}
