//! User-facing notifications.
//!
//! Background work (artwork downloads, sidecar writes) reports problems here
//! instead of returning them to whoever scheduled it. Pushing never blocks and
//! never fails.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;

/// Maximum messages kept by a [`MessageQueue`] before the oldest are dropped
const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageLevel::Success => "success",
            MessageLevel::Error => "error",
            MessageLevel::Warning => "warning",
            MessageLevel::Info => "info",
        };
        f.write_str(s)
    }
}

/// A single notification.
///
/// `message_key` names a translatable template (`artwork.download.failed`);
/// `args` fill its placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Unique ID (for removal from a queue)
    pub id: u64,
    pub level: MessageLevel,
    /// What the message is about, e.g. an item path or URL
    pub subject: String,
    pub message_key: String,
    pub args: Vec<String>,
}

impl Message {
    pub fn new(
        level: MessageLevel,
        subject: impl Into<String>,
        message_key: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        Self {
            id: COUNTER.fetch_add(1, Ordering::Relaxed),
            level,
            subject: subject.into(),
            message_key: message_key.into(),
            args,
        }
    }

    pub fn error(subject: impl Into<String>, message_key: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(MessageLevel::Error, subject, message_key, args)
    }

    pub fn warning(subject: impl Into<String>, message_key: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(MessageLevel::Warning, subject, message_key, args)
    }

    pub fn info(subject: impl Into<String>, message_key: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(MessageLevel::Info, subject, message_key, args)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.subject, self.message_key)?;
        if !self.args.is_empty() {
            write!(f, " ({})", self.args.join(", "))?;
        }
        Ok(())
    }
}

/// Receiver of notifications.
pub trait NotificationSink: Send + Sync {
    fn push_message(&self, message: Message);
}

/// Writes every message to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn push_message(&self, message: Message) {
        match message.level {
            MessageLevel::Error => tracing::error!(
                subject = %message.subject,
                key = %message.message_key,
                args = ?message.args,
                "Notification"
            ),
            MessageLevel::Warning => tracing::warn!(
                subject = %message.subject,
                key = %message.message_key,
                args = ?message.args,
                "Notification"
            ),
            MessageLevel::Success | MessageLevel::Info => tracing::info!(
                subject = %message.subject,
                key = %message.message_key,
                args = ?message.args,
                "Notification"
            ),
        }
    }
}

/// Bounded in-memory queue a front end can poll. Keeps the most recent
/// messages and mirrors each one to the log.
#[derive(Debug)]
pub struct MessageQueue {
    messages: Mutex<VecDeque<Message>>,
    capacity: usize,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Take all pending messages, oldest first.
    pub fn drain(&self) -> Vec<Message> {
        self.messages.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for MessageQueue {
    fn push_message(&self, message: Message) {
        TracingSink.push_message(message.clone());
        let mut messages = self.messages.lock();
        messages.push_back(message);
        while messages.len() > self.capacity {
            messages.pop_front();
        }
    }
}
