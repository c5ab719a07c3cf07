//! Ramorie - agent tool server and CLI
//!
//! Entry point for the `ramorie` binary. The MCP server speaks JSON-RPC on
//! stdout, so all logging goes to stderr.

use clap::{Parser, Subcommand};
use ramorie_core::error::Result;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::config::ConfigAction;
use cli::mcp::McpAction;

#[derive(Parser)]
#[command(name = "ramorie")]
#[command(about = "AI agent memory and task management client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Model Context Protocol server for AI agents
    Mcp {
        #[command(subcommand)]
        action: McpAction,
    },

    /// Relevance-ranked memory search
    Recall {
        /// Search terms (space = any, comma = all)
        term: String,

        /// Project name or ID
        #[arg(short, long)]
        project: Option<String>,

        /// Only memories carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Only memories linked to a task
        #[arg(long)]
        linked_task: bool,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Minimum relevance score
        #[arg(long, default_value = "0")]
        min_score: i64,
    },

    /// Manage local configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn log_filter(raw: &str) -> EnvFilter {
    let level = match raw {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let level = level.as_str().to_lowercase();

    // Keep HTTP internals quiet unless something is wrong
    EnvFilter::new(format!(
        "ramorie={level},ramorie_core={level},reqwest=warn,hyper=warn"
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr) // stdout carries protocol frames
        .init();

    debug!("Ramorie v{} starting...", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Mcp { action } => cli::mcp::handle(action).await,
        Commands::Recall {
            term,
            project,
            tag,
            linked_task,
            limit,
            min_score,
        } => {
            cli::recall::handle(cli::recall::RecallOptions {
                term,
                project,
                tag,
                linked_task,
                limit,
                min_score,
            })
            .await
        }
        Commands::Config { action } => cli::config::handle(action).await,
    }
}
