mod config;
mod generate_cmd;
mod serve_cmd;
mod todo_cmd;

#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use nudge_core::{AnswerSet, ProviderKind};
use nudge_store::TaskStore;

use config::{CliOverrides, NudgeConfig};

#[derive(Parser)]
#[command(name = "nudge", about = "Turn three answers into a weekly plan")]
struct Cli {
    /// Generation provider: gemini or openai (overrides NUDGE_PROVIDER)
    #[arg(long, global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter nudge config file (preconfigures --provider, default gemini)
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Serve the question form and plan generation over HTTP
    Serve {
        /// Address to bind (default 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides PORT env var; default 5000)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate a plan once and print it
    Generate {
        /// Something you have wanted to do lately
        #[arg(long)]
        q1: String,
        /// A goal to reach within three months
        #[arg(long)]
        q2: String,
        /// A task you keep putting off
        #[arg(long)]
        q3: String,
    },
    /// Manage the to-do list
    Todo {
        /// Task file (overrides NUDGE_TODO_FILE; default tasks.json)
        #[arg(long)]
        file: Option<PathBuf>,

        #[command(subcommand)]
        command: TodoCommands,
    },
}

#[derive(Subcommand)]
pub enum TodoCommands {
    /// Show all tasks and the lazy score
    List,
    /// Add a task
    Add {
        /// What to do
        title: String,
        /// When to do it (free text)
        #[arg(default_value = "")]
        time: String,
    },
    /// Mark a task as done
    Done {
        /// Task index as shown by `list`
        index: usize,
    },
    /// Put a task off once more
    Postpone {
        /// Task index as shown by `list`
        index: usize,
    },
    /// Delete every task
    Reset,
}

/// Execute the `nudge init` command: write config file.
fn cmd_init(provider: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let provider: ProviderKind = provider.parse()?;
    config::save_config(&config::starter_config(provider))?;

    println!("Config written to {}", path.display());
    println!("  provider.kind = {provider}");
    println!("  provider.model = {}", provider.default_model());
    println!();
    println!(
        "Next: export {} (and optionally NOTION_TOKEN / NOTION_DATABASE_ID), \
         then run `nudge serve`.",
        provider.api_key_env()
    );

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            let provider = cli.provider.as_deref().unwrap_or("gemini");
            cmd_init(provider, force)?;
        }
        Commands::Serve { bind, port } => {
            let resolved = NudgeConfig::resolve(&CliOverrides {
                provider: cli.provider,
                bind,
                port,
                ..CliOverrides::default()
            })?;
            let handler = resolved.build_handler()?;
            serve_cmd::run_serve(handler, &resolved.server).await?;
        }
        Commands::Generate { q1, q2, q3 } => {
            let resolved = NudgeConfig::resolve(&CliOverrides {
                provider: cli.provider,
                ..CliOverrides::default()
            })?;
            let handler = resolved.build_handler()?;
            generate_cmd::run_generate(&handler, &AnswerSet::new(q1, q2, q3)).await;
        }
        Commands::Todo { file, command } => {
            let resolved = NudgeConfig::resolve(&CliOverrides {
                provider: cli.provider,
                todo_file: file,
                ..CliOverrides::default()
            })?;
            let store = TaskStore::from_config(&resolved.store);
            todo_cmd::run_todo(&store, command)?;
        }
    }

    Ok(())
}
