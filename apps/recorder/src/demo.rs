//! `demo`: subscribe, stream, validate, unsubscribe and verify silence.

use crate::error::AppError;
use clap::Args;
use serde_json::Value;
use std::time::Duration;
use streamprobe_core::{Channel, Options, TickerRecord};
use streamprobe_feeds::{SessionConfig, SubscriptionSession};
use streamprobe_validation::{check_ticker, validate_channel_schema};
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Comma-separated currency pairs
    #[arg(long, value_delimiter = ',', default_value = "BTC/USD,SOL/USD")]
    pub pairs: Vec<String>,

    /// Number of ticker messages to collect
    #[arg(long, default_value_t = 5)]
    pub count: usize,

    /// How long to watch for data after unsubscribing, in seconds
    #[arg(long, default_value_t = 20)]
    pub silence_secs: u64,
}

/// Outcome of a demo run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DemoReport {
    pub messages: usize,
    pub records: usize,
    pub violations: Vec<String>,
    pub leaked: usize,
}

impl DemoReport {
    pub fn into_result(self) -> Result<Self, AppError> {
        if !self.violations.is_empty() {
            return Err(AppError::Violations(self.violations.len()));
        }
        if self.leaked > 0 {
            return Err(AppError::NotSilent {
                channel: Channel::Ticker.to_string(),
                count: self.leaked,
            });
        }
        Ok(self)
    }
}

pub async fn run(config: SessionConfig, args: DemoArgs, poll: Duration) -> Result<DemoReport, AppError> {
    let mut session = SubscriptionSession::new(config);
    session.open().await?;
    let report = run_on(&mut session, &args, poll).await;
    session.close().await;
    report?.into_result()
}

pub async fn run_on(
    session: &mut SubscriptionSession,
    args: &DemoArgs,
    poll: Duration,
) -> Result<DemoReport, AppError> {
    let mut report = DemoReport::default();

    let ack = session.subscribe(Channel::Ticker, &args.pairs, Options::new()).await?;
    info!("Subscribed: {:?}", ack.result);

    let timeout = session.config().timeout();
    let data = session.receive_data(args.count, timeout).await?;
    report.messages = data.len();
    info!("Received {} ticker message(s)", data.len());

    for msg in &data {
        let raw = serde_json::to_value(msg).unwrap_or(Value::Null);
        if let Err(e) = validate_channel_schema(&raw, Channel::Ticker) {
            warn!("Schema: {}", e);
            report.violations.push(e.to_string());
            continue;
        }

        let records: Vec<TickerRecord> = match msg.records() {
            Ok(records) => records,
            Err(e) => {
                report.violations.push(e.to_string());
                continue;
            }
        };
        for record in records {
            report.records += 1;
            info!(
                "  {} bid={} ask={} last={} volume={}",
                record.symbol, record.bid, record.ask, record.last, record.volume
            );
            for violation in check_ticker(&record, &args.pairs) {
                warn!("  {}: {}", record.symbol, violation);
                report.violations.push(format!("{}: {}", record.symbol, violation));
            }
        }
    }

    session.unsubscribe(Channel::Ticker, &args.pairs, Options::new()).await?;
    info!("Unsubscribed, watching for {}s", args.silence_secs);

    let leaked = session
        .watch_silence(
            Channel::Ticker.as_str(),
            Duration::from_secs(args.silence_secs),
            poll,
        )
        .await?;
    report.leaked = leaked.len();
    if leaked.is_empty() {
        info!("No ticker data after unsubscribe");
    }

    Ok(report)
}
