//! Transient notifications shown in the corner of the dashboard

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

/// Queue of visible toasts, oldest first
pub struct Toasts {
    ttl: Duration,
    items: VecDeque<(Toast, Instant)>,
    max_visible: usize,
}

impl Toasts {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            items: VecDeque::new(),
            max_visible: 3,
        }
    }

    pub fn push(&mut self, toast: Toast) {
        match toast.kind {
            ToastKind::Info => tracing::info!(message = %toast.message, "toast"),
            ToastKind::Error => tracing::warn!(message = %toast.message, "error toast"),
        }
        self.items.push_back((toast, Instant::now()));
        while self.items.len() > self.max_visible {
            self.items.pop_front();
        }
    }

    /// Drop toasts older than the ttl
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|(_, shown_at)| now.saturating_duration_since(*shown_at) < ttl);
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter().map(|(t, _)| t)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
