use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pf_cli::PromptEngine;
use pf_cli::ui::{display_banner, display_error, display_models, display_outcome, display_report};
use pf_core::{
    AdvisoryService, Complexity, EngineConfig, ExampleSelector, GenerationService, Length,
    ModelCatalog, Mode, PromptSpec, Tone, UnavailableService,
};
use pf_gemini::{GeminiClient, GeminiConfig};

const DEFAULT_LOG_FILTER: &str = "promptforge=info,pf_cli=info,pf_gemini=info";

#[derive(Parser)]
#[command(name = "promptforge", version)]
#[command(about = "Build, score and generate prompts for generative AI models", long_about = None)]
struct Cli {
    /// Print machine-readable JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a prompt spec and list issues and suggestions
    Analyze {
        #[command(flatten)]
        spec: SpecArgs,
    },
    /// Generate a finished prompt
    Generate {
        #[command(flatten)]
        spec: SpecArgs,

        /// Seed for picking the fallback example
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Rewrite an existing prompt
    Refine {
        #[command(flatten)]
        spec: SpecArgs,

        /// Prompt text to refine
        #[arg(long)]
        previous: String,

        /// Requested modification
        #[arg(long)]
        change: String,

        /// Seed for picking the fallback example
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List the models offered by the generation service
    Models,
}

#[derive(Args)]
struct SpecArgs {
    /// Topic keywords
    keywords: Option<String>,

    /// Load the spec from a JSON file; flags override its fields
    #[arg(long)]
    spec_file: Option<PathBuf>,

    /// app_creation, image_generation, content_creation, problem_solving, coding, instruct, explain
    #[arg(short, long)]
    mode: Option<Mode>,

    #[arg(short, long)]
    context: Option<String>,

    #[arg(short, long)]
    tone: Option<Tone>,

    #[arg(long)]
    complexity: Option<Complexity>,

    #[arg(short, long)]
    length: Option<Length>,

    /// Ask for examples in the prompt
    #[arg(long)]
    examples: bool,

    /// Image style (image_generation only)
    #[arg(long)]
    style: Option<String>,

    /// What the image must not contain (image_generation only)
    #[arg(long)]
    negative: Option<String>,
}

impl SpecArgs {
    async fn into_spec(self) -> Result<PromptSpec> {
        let mut spec = match &self.spec_file {
            Some(path) => PromptSpec::from_json_file(path)
                .await
                .with_context(|| format!("failed to load spec from {}", path.display()))?,
            None => PromptSpec::new(
                self.keywords.clone().unwrap_or_default(),
                self.mode.unwrap_or(Mode::AppCreation),
            ),
        };

        if let Some(keywords) = self.keywords {
            spec.keywords = keywords;
        }
        if let Some(mode) = self.mode {
            spec.mode = mode;
        }
        if let Some(context) = self.context {
            spec.context = Some(context);
        }
        if let Some(tone) = self.tone {
            spec.tone = tone;
        }
        if let Some(complexity) = self.complexity {
            spec.complexity = complexity;
        }
        if let Some(length) = self.length {
            spec.length = length;
        }
        if self.examples {
            spec.include_examples = true;
        }
        if let Some(style) = self.style {
            spec.image_style = Some(style);
        }
        if let Some(negative) = self.negative {
            spec.negative_prompt = Some(negative);
        }

        Ok(spec)
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn selector(seed: Option<u64>) -> ExampleSelector {
    seed.map(ExampleSelector::Seed).unwrap_or_default()
}

/// Print validation failures for the user and exit non-zero; anything else
/// propagates
fn exit_on_validation(err: pf_core::Error) -> anyhow::Error {
    if err.is_validation() {
        display_error(&err.to_string());
        std::process::exit(1);
    }
    err.into()
}

async fn run<G, A, C>(
    command: Commands,
    json: bool,
    engine: PromptEngine<G, A>,
    catalog: C,
) -> Result<()>
where
    G: GenerationService,
    A: AdvisoryService,
    C: ModelCatalog,
{
    match command {
        Commands::Analyze { spec } => {
            let spec = spec.into_spec().await?;
            let report = engine.analyze(&spec).await.map_err(exit_on_validation)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display_report(&report);
            }
        }
        Commands::Generate { spec, seed } => {
            let spec = spec.into_spec().await?;
            let engine = engine.with_selector(selector(seed));
            let outcome = engine.generate(&spec).await.map_err(exit_on_validation)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                display_outcome(&outcome);
            }
        }
        Commands::Refine {
            spec,
            previous,
            change,
            seed,
        } => {
            let spec = spec.into_spec().await?;
            let engine = engine.with_selector(selector(seed));
            let outcome = engine
                .refine(&spec, &previous, &change)
                .await
                .map_err(exit_on_validation)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                display_outcome(&outcome);
            }
        }
        Commands::Models => {
            let models = catalog.list_models().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&models)?);
            } else {
                display_models(&models);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let config = EngineConfig::from_env()?;

    if !cli.json {
        display_banner();
    }

    match GeminiConfig::from_env() {
        Ok(gemini) => {
            let engine = PromptEngine::with_advisor(
                GeminiClient::new(gemini.clone())?,
                GeminiClient::new(gemini.clone())?,
                config,
            );
            run(cli.command, cli.json, engine, GeminiClient::new(gemini)?).await
        }
        Err(e) => {
            tracing::warn!("{}; running offline with local fallback only", e);
            let engine = PromptEngine::with_advisor(UnavailableService, UnavailableService, config);
            run(cli.command, cli.json, engine, UnavailableService).await
        }
    }
}
