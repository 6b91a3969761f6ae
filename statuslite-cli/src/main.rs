mod commands;
mod context;
mod logging;
mod transport;
mod tui;
mod ui;

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use context::Context;

#[derive(Parser)]
#[command(name = "statuslite")]
#[command(about = "A tiny status page for your services", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to $STATUSLITE_CONFIG or statuslite.yml in cwd and parents)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter statuslite.yml
    Init {
        #[arg(short, long)]
        yes: bool,
    },
    /// Open the interactive status page (default)
    Tui,
    /// List services and their last known status
    List,
    /// Probe every service once and save the results
    Check {
        /// Print the updated records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a monitor
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        url: Option<String>,
    },
    /// Remove a monitor by id or unique id prefix
    Remove { id: String },
    /// Advance a service to its next status
    Cycle { id: String },
    /// Print the overall status; exit code 0, 1 or 2
    Status,
    /// Restore the default service list
    Reset,
}

fn load_context(path: Option<&PathBuf>) -> Context {
    match Context::load(path.map(PathBuf::as_path)) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn exit_on_error(result: Result<(), String>) -> io::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Some(Commands::Tui) | None => {
            let ctx = load_context(cli.config.as_ref());
            logging::init_file(&ctx.data_dir)?;
            return tui::run_tui(ctx).await;
        }
        Some(command) => command,
    };

    logging::init_stderr();

    if let Commands::Init { yes } = command {
        return exit_on_error(commands::run_init(yes));
    }

    let ctx = load_context(cli.config.as_ref());
    match command {
        Commands::List => exit_on_error(commands::run_list(&ctx)),
        Commands::Check { json } => exit_on_error(commands::run_check(&ctx, json).await),
        Commands::Add {
            name,
            description,
            url,
        } => exit_on_error(commands::run_add(&ctx, name, description, url)),
        Commands::Remove { id } => exit_on_error(commands::run_remove(&ctx, &id)),
        Commands::Cycle { id } => exit_on_error(commands::run_cycle(&ctx, &id)),
        Commands::Reset => exit_on_error(commands::run_reset(&ctx)),
        Commands::Status => match commands::run_status(&ctx) {
            Ok(code) => std::process::exit(code),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Init { .. } | Commands::Tui => Ok(()),
    }
}
