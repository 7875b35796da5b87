//! Rollcall CLI - offline bulk imports and dry runs.
//!
//! # Usage
//!
//! ```bash
//! # Register every valid row and write the report to ./reports
//! rollcall import users.xlsx
//!
//! # Register through a running server, four calls at a time
//! rollcall import users.xlsx --registrar-url http://localhost:3000/api/registerUser --concurrency 4
//!
//! # Show what an import would do without registering anyone
//! rollcall preview users.xlsx
//! ```
//!
//! # Commands
//!
//! - `import` - Run a bulk import and save the report
//! - `preview` - Dry run: log the plan for every row

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(author, version, about = "Rollcall bulk registration tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register users from a spreadsheet and save the report
    Import {
        /// Workbook to import (`.xlsx`, `.xls`, `.xlsb`, `.ods`)
        file: PathBuf,

        /// Directory the report is written to
        #[arg(short, long, env = "ROLLCALL_REPORT_DIR", default_value = "reports")]
        out_dir: PathBuf,

        /// Remote `registerUser` endpoint (registers in-process when unset)
        #[arg(long, env = "ROLLCALL_REGISTRAR_URL")]
        registrar_url: Option<Url>,

        /// Registration calls in flight at once
        #[arg(short, long, env = "ROLLCALL_IMPORT_CONCURRENCY", default_value = "1")]
        concurrency: NonZeroUsize,
    },
    /// Show what an import would do, without registering anyone
    Preview {
        /// Workbook to inspect
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Import {
            file,
            out_dir,
            registrar_url,
            concurrency,
        } => {
            commands::import::run(&file, &out_dir, registrar_url, concurrency).await?;
        }
        Commands::Preview { file } => {
            commands::preview::run(&file).await?;
        }
    }
    Ok(())
}
