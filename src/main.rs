// ABOUTME: Entry point for ava — a terminal chat assistant with history-aware prompting.
// ABOUTME: Parses CLI args, loads env and config, then dispatches to chat, test-graph, or prompts.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ava::app::{self, App};
use ava::config::Config;
use ava::graph::{self, GraphKind, HttpGraphRunner};

#[derive(Parser, Debug)]
#[command(name = "ava", version, about = "Terminal chat with LLMs")]
struct Cli {
    /// Config file (defaults to ~/.ava/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start an interactive chat session.
    Chat {
        /// Model identifier, e.g. gpt-4o or llama3.1.
        #[arg(long)]
        model: Option<String>,

        /// Print each reply once it is complete.
        #[arg(long)]
        no_stream: bool,
    },
    /// Run one of the external graph pipelines and print its output.
    TestGraph {
        #[arg(value_enum, value_name = "TYPE", default_value_t = GraphKind::Youtube)]
        kind: GraphKind,

        /// Accepted for compatibility; has no effect.
        #[arg(short, long)]
        force: bool,
    },
    /// List prompt templates, or print/render one by name.
    Prompts {
        name: Option<String>,

        /// Template variable as key=value. Repeatable.
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = app::parse_var)]
        vars: Vec<(String, String)>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Local .env first, then ~/ava.env; neither overrides variables already set.
    let _ = dotenvy::dotenv();
    let _ = dotenvy::from_path(Config::env_file_path());

    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Chat { model, no_stream } => {
            App::new(config, model)
                .with_streaming(!no_stream)
                .run()
                .await
        }
        Command::TestGraph { kind, force } => {
            debug!(?kind, force, "test-graph");
            let runner = HttpGraphRunner::from_env(config.graph)?;
            graph::run_test_graph(&runner, kind, &mut std::io::stdout()).await
        }
        Command::Prompts { name, vars } => {
            app::run_prompts(name.as_deref(), &vars, &mut std::io::stdout())
        }
    }
}
