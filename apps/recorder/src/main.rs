//! streamprobe - record and exercise an exchange's streaming API.

mod config;
mod demo;
mod error;
mod record;

use clap::{Parser, Subcommand};
use config::AppConfig;
use demo::DemoArgs;
use record::RecordArgs;
use std::path::PathBuf;
use std::process::ExitCode;
use streamprobe_feeds::FixtureStore;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// streamprobe CLI
#[derive(Parser, Debug)]
#[command(name = "streamprobe")]
#[command(about = "Streaming API recorder and smoke tester", long_about = None)]
struct Args {
    /// Configuration file path (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a channel into fixture files
    Record(RecordArgs),
    /// Subscribe to tickers, validate them, unsubscribe and verify silence
    Demo(DemoArgs),
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // RUST_LOG wins over --log-level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_logging(&args.log_level);

    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Endpoint: {}", config.session.ws_url);

    let result = match args.command {
        Command::Record(record_args) => {
            let out = record_args
                .out
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.fixtures_dir));
            record::run(config.session.clone(), FixtureStore::new(out), record_args)
                .await
                .map(|_| ())
        }
        Command::Demo(demo_args) => {
            demo::run(config.session.clone(), demo_args, config.silence_poll())
                .await
                .map(|report| {
                    info!(
                        "Demo passed: {} message(s), {} record(s)",
                        report.messages, report.records
                    );
                })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
