use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter your search query.";
pub const NO_RESULTS_MESSAGE: &str = "No movies found.";
pub const FETCH_FAILED_MESSAGE: &str = "There was an error, please try again...";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient user-facing message (toast)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub issued_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            issued_at: Utc::now(),
        }
    }
}

/// Fire-and-forget sending side of the notification channel
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl Notifier {
    /// Creates a notifier together with the receiver that observes it
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn info(&self, message: impl Into<String>) {
        self.send(Notice::new(NoticeLevel::Info, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(Notice::new(NoticeLevel::Error, message));
    }

    fn send(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            tracing::debug!("Notice dropped, no receiver attached");
        }
    }
}
