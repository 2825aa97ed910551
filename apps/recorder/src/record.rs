//! `record`: capture a live channel into fixture files.

use crate::error::AppError;
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use streamprobe_core::{Channel, Options};
use streamprobe_feeds::{FixtureStore, SessionConfig, SubscriptionSession};
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Channel: ticker, book, ohlc, trade
    #[arg(long)]
    pub channel: Channel,

    /// Currency pair
    #[arg(long, default_value = "BTC/USD")]
    pub pair: String,

    /// Number of data messages to record
    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// Book depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Candle interval in minutes
    #[arg(long)]
    pub interval: Option<u32>,

    /// Request an initial snapshot
    #[arg(long)]
    pub snapshot: Option<bool>,

    /// Output directory (defaults to the configured fixtures directory)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Overall wait for data messages, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl RecordArgs {
    fn options(&self) -> Options {
        let mut options = Options::new();
        if let Some(depth) = self.depth {
            options = options.depth(depth);
        }
        if let Some(interval) = self.interval {
            options = options.interval(interval);
        }
        if let Some(snapshot) = self.snapshot {
            options = options.snapshot(snapshot);
        }
        options
    }
}

/// Files written by one recording.
#[derive(Debug, Clone)]
pub struct Recording {
    pub ack_path: PathBuf,
    pub data_path: PathBuf,
    pub messages: usize,
}

pub async fn run(config: SessionConfig, store: FixtureStore, args: RecordArgs) -> Result<Recording, AppError> {
    let recording = SubscriptionSession::scoped(config, move |session| {
        Box::pin(async move { Ok(record_on(session, &store, &args).await) })
    })
    .await??;

    info!(
        "Recorded {} message(s): {}, {}",
        recording.messages,
        recording.ack_path.display(),
        recording.data_path.display()
    );
    Ok(recording)
}

/// Subscribe, save the acknowledgment, save `count` data messages, unsubscribe.
pub async fn record_on(
    session: &mut SubscriptionSession,
    store: &FixtureStore,
    args: &RecordArgs,
) -> Result<Recording, AppError> {
    let channel = args.channel.as_str();
    let pairs = [args.pair.as_str()];

    info!("Subscribing to {} {}", channel, args.pair);
    let ack = session.subscribe(channel, &pairs, args.options()).await?;
    let ack_name = FixtureStore::fixture_name(channel, &args.pair, "subscribe_ack", Utc::now());
    let ack_path = store.save(&ack_name, &ack)?;

    info!("Collecting {} {} message(s)", args.count, channel);
    let data = session
        .receive_data(args.count, Duration::from_secs(args.timeout_secs))
        .await?;
    if data.len() < args.count {
        warn!("Only {} of {} message(s) arrived", data.len(), args.count);
    }
    let data_name = FixtureStore::fixture_name(channel, &args.pair, "data", Utc::now());
    let data_path = store.save(&data_name, &data)?;

    // Fixtures are already on disk; a failed unsubscribe still fails the run.
    session.unsubscribe(channel, &pairs, args.options()).await?;

    Ok(Recording {
        ack_path,
        data_path,
        messages: data.len(),
    })
}
