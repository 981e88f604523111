//! API Contract Validator CLI
//!
//! Command-line interface for checking a live API against its OpenAPI contract.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use api_contract_validator::{
    load_contract_auto, render_json, render_text, validate_base_url, validate_contract,
    validate_spec_source, write_report, HttpConfig, HttpTransport,
};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "api-contract-validator")]
#[command(about = "Validate a running API against its OpenAPI specification")]
#[command(version)]
struct Cli {
    /// OpenAPI spec: file path (YAML/JSON) or URL (http:// or https://)
    #[arg(long, short)]
    spec: String,

    /// Base URL of the API to validate (e.g. https://api.example.com)
    #[arg(long, short = 'u')]
    base_url: String,

    /// Report file; .html/.htm for HTML, .json for JSON, anything else for text
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print the result as JSON on stdout (for automation)
    #[arg(long)]
    json: bool,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = 10)]
    connect_timeout: u64,

    /// Read timeout in seconds; bounds the whole request, body included
    #[arg(long, default_value_t = 30)]
    read_timeout: u64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_logging(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<(), u8> {
    // Operator errors abort before any endpoint is attempted.
    validate_spec_source(&cli.spec).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let base_url = validate_base_url(&cli.base_url).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    info!(spec = %cli.spec, base_url = %base_url, "starting API contract validation");

    let contract = load_contract_auto(cli.spec.trim()).map_err(|e| {
        eprintln!("Error: loading contract: {}", e);
        e.exit_code() as u8
    })?;

    let config = HttpConfig::default()
        .connect_timeout(Duration::from_secs(cli.connect_timeout))
        .read_timeout(Duration::from_secs(cli.read_timeout));
    let transport = HttpTransport::new(&config).map_err(|e| {
        eprintln!("Error: {}", e);
        3u8
    })?;

    let result = validate_contract(&contract, &base_url, &transport);

    if cli.json {
        let output = render_json(&result).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;
        println!("{}", output);
    } else {
        print!("{}", render_text(&result));
    }

    if let Some(path) = &cli.output {
        write_report(&result, path).map_err(|e| {
            error!(error = %e, "failed to write report");
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;
        info!(path = %path.display(), "report saved");
    }

    if result.has_errors() {
        Err(1)
    } else {
        Ok(())
    }
}
