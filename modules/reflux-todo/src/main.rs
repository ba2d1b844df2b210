use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use reflux_logic::LogicConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reflux_todo::{load_config, FileConfig, TodoApp};

#[derive(Parser)]
#[command(name = "reflux-todo", about = "Run a scripted todo list session")]
struct Cli {
    /// Path to a TOML config file with seed todos and a script
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of undo steps kept
    #[arg(long)]
    history: Option<usize>,

    /// Pretty-print the resulting state
    #[arg(long)]
    pretty: bool,

    /// Commands to run after the config script, e.g. "add:Buy milk" "toggle:1"
    commands: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("reflux=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!(config = %path.display(), "Loading config");
            load_config(path)?
        }
        None => FileConfig::default(),
    };
    if let Some(history) = cli.history {
        config.history = history;
    }

    let app = TodoApp::new(&config, LogicConfig::from_env()?)?;
    app.run_script(&config.script).await?;
    app.run_script(&cli.commands).await?;

    let snapshot = app.snapshot();
    let output = if cli.pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };
    println!("{output}");

    Ok(())
}
