use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dy_core::commands::{
    run_categories, run_chat, run_tools, run_workspace, ChatArgs, CommandError, ToolsArgs,
    WorkspaceArgs,
};
use dy_core::config::Config;
use dy_core::renderer::TextRenderer;
use dy_core::style::Style;

#[derive(Parser)]
#[command(name = "dyad")]
#[command(about = "Dyad - simulated AI coding agent workspace")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/dyad/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tools in the directory
    Tools {
        /// Category id (all, ide, agent, cli, builder, model)
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive text matched against name and description
        #[arg(short, long)]
        search: Option<String>,

        /// JSON catalog to list instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// List directory categories
    Categories,

    /// Send prompts to the simulated agent and watch the responses
    Chat {
        /// Prompts, submitted one after another
        #[arg(required = true)]
        prompts: Vec<String>,

        /// Override the acknowledgment delay
        #[arg(long)]
        initial_delay_ms: Option<u64>,

        /// Override the completion delay
        #[arg(long)]
        completion_delay_ms: Option<u64>,

        /// Print transcript events as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show the agent workspace screen
    Workspace {
        /// Filter the file explorer
        #[arg(long)]
        files: Option<String>,

        /// Right-hand panel tab (preview, code)
        #[arg(long)]
        tab: Option<String>,

        /// Collapse the explorer sidebar
        #[arg(long)]
        hide_sidebar: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::load_from(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        },
        None => Config::load_or_default(),
    };

    let stdout = io::stdout();
    let style = Style::for_terminal(stdout.is_terminal());
    let mut out = TextRenderer::new(stdout.lock(), style);

    let result = match cli.command {
        Commands::Tools {
            category,
            search,
            catalog,
            json,
        } => {
            let args = ToolsArgs {
                category,
                search,
                catalog,
                json,
            };
            run_tools(&config, &args, &mut out)
        }
        Commands::Categories => run_categories(&config, &mut out),
        Commands::Chat {
            prompts,
            initial_delay_ms,
            completion_delay_ms,
            json,
        } => {
            let args = ChatArgs {
                prompts,
                initial_delay_ms,
                completion_delay_ms,
                json,
            };
            match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime.block_on(run_chat(&config, args, &mut out)),
                Err(e) => Err(CommandError::Io(e)),
            }
        }
        Commands::Workspace {
            files,
            tab,
            hide_sidebar,
        } => {
            let args = WorkspaceArgs {
                files,
                tab,
                hide_sidebar,
            };
            run_workspace(&args, &mut out)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}
