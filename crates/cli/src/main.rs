//! Client fingerprint inspection CLI.
//!
//! Builds a request context from command-line values (or the configured
//! offline substitutions) and prints what the fingerprint accessor extracts
//! from it as a JSON report.

use clap::{Parser, Subcommand};
use http::header::{HeaderValue, USER_AGENT};
use http::HeaderMap;
use log::LevelFilter;

use client_fingerprint_common::fingerprint::ClientFingerprint;
use client_fingerprint_common::logging::init_logging;
use client_fingerprint_common::request::HttpContext;
use client_fingerprint_common::settings::{ExecutionMode, Settings};

mod error;
mod report;

use error::CliError;
use report::FingerprintReport;

#[derive(Parser)]
#[command(name = "fpcli")]
#[command(about = "Inspect client fingerprint data for a request context")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a request context and print the fingerprint report
    Inspect {
        /// Remote peer address (REMOTE_ADDR equivalent)
        #[arg(long)]
        remote_addr: Option<String>,

        /// User-Agent header value
        #[arg(long)]
        user_agent: Option<String>,

        /// Externally assigned session identifier
        #[arg(long)]
        session_id: Option<String>,

        /// Substitute the configured offline address and user agent
        #[arg(long)]
        offline: bool,

        /// Maximum user-agent length in characters
        #[arg(long)]
        max_length: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    if let Err(err) = run(cli) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Inspect {
            remote_addr,
            user_agent,
            session_id,
            offline,
            max_length,
        } => inspect(remote_addr, user_agent, session_id, offline, max_length),
    }
}

fn inspect(
    remote_addr: Option<String>,
    user_agent: Option<String>,
    session_id: Option<String>,
    offline: bool,
    max_length: Option<usize>,
) -> Result<(), CliError> {
    let mut settings = Settings::new().map_err(|e| CliError::Config(format!("{e:?}")))?;
    if offline {
        settings.mode = ExecutionMode::Offline;
    }

    let mut headers = HeaderMap::new();
    if let Some(value) = &user_agent {
        let value = HeaderValue::from_str(value)
            .map_err(|e| CliError::InvalidArgument(format!("user agent: {e}")))?;
        headers.insert(USER_AGENT, value);
    }

    let mut context = HttpContext::new(remote_addr.unwrap_or_default()).with_headers(headers);
    if let Some(id) = session_id {
        context = context.with_session_id(id);
    }

    let max_length = max_length.unwrap_or(settings.user_agent.max_length);
    let fingerprint = ClientFingerprint::from_settings(&settings, context);
    let report = FingerprintReport::collect(&fingerprint, max_length);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
