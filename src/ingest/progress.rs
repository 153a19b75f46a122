//! Progress notifications for an ingestion.
//!
//! Publishing is fire-and-forget: [`ProgressSink::emit`] has no return value,
//! and sinks swallow delivery failures (closed channel, no listener).

use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// One progress step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    /// 0 to 100, non-decreasing within one ingestion
    pub percent: u8,
    pub text: String,
}

impl ProgressUpdate {
    pub fn new(percent: u8, text: impl Into<String>) -> Self {
        Self {
            percent: percent.min(100),
            text: text.into(),
        }
    }
}

/// Receiver of progress updates.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, update: ProgressUpdate);
}

/// Discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn emit(&self, _update: ProgressUpdate) {}
}

/// Writes each update to the log at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn emit(&self, update: ProgressUpdate) {
        log::info!("[{:>3}%] {}", update.percent, update.text);
    }
}

/// Forwards updates to an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelProgressSink {
    tx: UnboundedSender<ProgressUpdate>,
}

impl ChannelProgressSink {
    pub fn new(tx: UnboundedSender<ProgressUpdate>) -> Self {
        Self { tx }
    }

    /// A sink plus the receiver that observes it.
    pub fn channel() -> (Self, UnboundedReceiver<ProgressUpdate>) {
        let (tx, rx) = unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, update: ProgressUpdate) {
        let _ = self.tx.send(update);
    }
}
