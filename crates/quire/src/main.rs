// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quire command-line entry point.

use clap::{Parser, Subcommand};
use quire::serve::ServeOverrides;

/// Quire - an extension-driven static site framework.
#[derive(Parser, Debug)]
#[command(name = "quire", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the preview server.
    Serve {
        /// Address to bind (overrides `server.host`).
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides `server.port`).
        #[arg(long, short)]
        port: Option<u16>,
        /// Log every request.
        #[arg(long)]
        logging: bool,
        /// Activate an extension on the served app. Repeatable.
        #[arg(long = "activate", value_name = "NAME")]
        activate: Vec<String>,
    },
    /// Inspect registered extensions.
    Extensions {
        #[command(subcommand)]
        action: ExtensionsAction,
    },
}

#[derive(Subcommand, Debug)]
enum ExtensionsAction {
    /// List every registered extension and its state.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Scan installed packages and report what was activated.
    Discover,
    /// Search the built-in extensions by name or description.
    Search {
        /// Words that must all appear.
        #[arg(required = true)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match quire_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            quire_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    quire::init_tracing(&config.log.level);

    let result = match cli.command {
        Commands::Serve {
            host,
            port,
            logging,
            activate,
        } => {
            let overrides = ServeOverrides {
                host,
                port,
                logging,
                activate,
            };
            quire::serve::run_serve(config, overrides).await
        }
        Commands::Extensions { action } => match action {
            ExtensionsAction::List { json } => quire::extensions::list(&config, json).map(|out| print!("{out}")),
            ExtensionsAction::Discover => quire::extensions::discover(&config).map(|out| print!("{out}")),
            ExtensionsAction::Search { query } => {
                print!("{}", quire::extensions::search(&query.join(" ")));
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
