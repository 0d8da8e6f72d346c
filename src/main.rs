mod error;
mod fetch;
mod format;
mod log;
mod parser;
mod patch;
mod pipeline;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::log::RunLog;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "bbs_sync", about = "Import telnetbbsguide.com listings into the BBS directory page")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Page to patch (default: index.html next to the executable)
    #[arg(long, global = true)]
    target: Option<PathBuf>,
    /// Run log (default: bbs_update.log next to the executable)
    #[arg(long, global = true)]
    log: Option<PathBuf>,
    /// Directory page to scrape
    #[arg(long, global = true)]
    url: Option<String>,
    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, extract and splice into the target page (default)
    Run {
        /// Validate the splice without writing the target
        #[arg(long)]
        dry_run: bool,
    },
    /// Extract listings from a saved copy of the directory page and print the entries
    Parse {
        /// Saved HTML file
        input: PathBuf,
    },
    /// Verify the target page still has the import markers
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(target) = cli.target {
        settings.target_file = target;
    }
    if let Some(log) = cli.log {
        settings.log_file = log;
    }
    if let Some(url) = cli.url {
        settings.source_url = url;
    }
    if let Some(timeout) = cli.timeout {
        settings.timeout_secs = timeout;
    }

    match cli.command.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => {
            let log = RunLog::new(&settings.log_file);
            let ok = pipeline::run(&settings, &log, dry_run).await;
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Parse { input } => {
            let html = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {:?}", input))?;
            let listings = parser::extract_listings(&html);
            print!("{}", format::format_listings(&listings)?);
            eprintln!("{} listings", listings.len());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check => {
            let path = &settings.target_file;
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            match patch::imported_count(&text) {
                Ok(n) => {
                    println!("{}: markers OK, {} imported entries", path.display(), n);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    println!("{}: {}", path.display(), e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
