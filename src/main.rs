use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use arch_research::config::settings_path;
use arch_research::{ArchitectureResearch, ChatCompletionClient, EngineSettings, KnowledgeTree};

#[derive(Parser)]
#[command(name = "arch-research", about = "Analyze and compare software architecture descriptions")]
struct Cli {
    /// Settings file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    model: Option<String>,

    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one architecture description
    Analyze { file: PathBuf },
    /// Compare several architecture descriptions in one request
    Compare {
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },
    /// Analyze every node of a JSON knowledge tree
    Forward { knowledge_base: PathBuf },
    /// Check that the backend is reachable
    Ping,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    let client = ChatCompletionClient::new(settings).context("failed to build http client")?;

    match cli.command {
        Command::Ping => {
            println!("{}", client.test_connection()?);
        }
        Command::Analyze { file } => {
            let module = ArchitectureResearch::new(client)?;
            println!("{}", module.analyze(&read_description(&file)?)?);
        }
        Command::Compare { files } => {
            let descriptions = files
                .iter()
                .map(|f| read_description(f))
                .collect::<Result<Vec<_>>>()?;
            let module = ArchitectureResearch::new(client)?;
            println!("{}", module.compare(descriptions.as_slice())?);
        }
        Command::Forward { knowledge_base } => {
            let tree = KnowledgeTree::from_path(&knowledge_base)
                .with_context(|| format!("failed to load {}", knowledge_base.display()))?;
            let module = ArchitectureResearch::new(client)?;
            let result = module.forward(&tree)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn load_settings(cli: &Cli) -> Result<EngineSettings> {
    let settings = match &cli.config {
        Some(path) => EngineSettings::load_from(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?,
        None => EngineSettings::load().with_context(|| {
            format!("failed to read settings from {}", settings_path().display())
        })?,
    };
    let mut settings = settings.with_env_overrides();

    if let Some(model) = &cli.model {
        settings.model = model.clone();
    }
    if let Some(url) = &cli.base_url {
        settings.base_url = url.clone();
    }
    Ok(settings)
}

fn read_description(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
