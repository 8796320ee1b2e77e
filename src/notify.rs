//! Transient user-facing notifications (toasts)

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Lifetime of error toasts
pub const DEFAULT_ERROR_TOAST: Duration = Duration::from_millis(5000);

/// Lifetime of every other toast
pub const DEFAULT_TOAST: Duration = Duration::from_millis(4000);

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Something failed
    Error,
    /// Something succeeded
    Success,
    /// Neutral information
    Info,
}

impl ToastKind {
    /// Heading shown above the message
    pub fn label(&self) -> &str {
        match self {
            Self::Error => "Error",
            Self::Success => "Success",
            Self::Info => "Info",
        }
    }
}

/// A dismissible notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Id used to dismiss the toast
    pub id: u64,
    /// Severity
    pub kind: ToastKind,
    /// Text shown to the user
    pub message: String,
    /// When the toast was raised
    pub raised_at: DateTime<Utc>,
    /// How long the toast stays visible
    pub duration: Duration,
}

impl Toast {
    /// Whether the toast should no longer be shown at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let elapsed = now.signed_duration_since(self.raised_at);
        elapsed.to_std().map(|e| e >= self.duration).unwrap_or(false)
    }
}

/// Toast lifetimes per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastDurations {
    /// Lifetime of error toasts
    pub error: Duration,
    /// Lifetime of success and info toasts
    pub default: Duration,
}

impl Default for ToastDurations {
    fn default() -> Self {
        Self {
            error: DEFAULT_ERROR_TOAST,
            default: DEFAULT_TOAST,
        }
    }
}

/// Stack of visible toasts, newest last
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    next_id: u64,
    items: Vec<Toast>,
    durations: ToastDurations,
}

impl Toasts {
    /// Create an empty stack
    pub fn new(durations: ToastDurations) -> Self {
        Self {
            next_id: 0,
            items: Vec::new(),
            durations,
        }
    }

    /// Raise an error toast
    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.raise(ToastKind::Error, message.into())
    }

    /// Raise a success toast
    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.raise(ToastKind::Success, message.into())
    }

    /// Raise an info toast
    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.raise(ToastKind::Info, message.into())
    }

    fn raise(&mut self, kind: ToastKind, message: String) -> u64 {
        self.next_id += 1;
        let duration = match kind {
            ToastKind::Error => self.durations.error,
            _ => self.durations.default,
        };
        self.items.push(Toast {
            id: self.next_id,
            kind,
            message,
            raised_at: Utc::now(),
            duration,
        });
        self.next_id
    }

    /// Dismiss a toast by id
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        self.items.len() != before
    }

    /// Dismiss the newest toast
    pub fn dismiss_latest(&mut self) -> bool {
        self.items.pop().is_some()
    }

    /// Drop toasts that expired at `now`, returning how many were removed
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.items.len();
        self.items.retain(|t| !t.is_expired(now));
        before - self.items.len()
    }

    /// Visible toasts, oldest first
    pub fn visible(&self) -> &[Toast] {
        &self.items
    }

    /// Newest toast
    pub fn latest(&self) -> Option<&Toast> {
        self.items.last()
    }

    /// Number of visible toasts of `kind`
    pub fn count(&self, kind: ToastKind) -> usize {
        self.items.iter().filter(|t| t.kind == kind).count()
    }

    /// Whether no toast is visible
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
