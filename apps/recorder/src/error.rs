use streamprobe_feeds::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0} integrity violation(s)")]
    Violations(usize),

    #[error("{count} {channel} message(s) received after unsubscribe")]
    NotSilent { channel: String, count: usize },
}
