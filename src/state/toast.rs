use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Option<String>,
    pub level: ToastLevel,
    pub message: String,
    pub created_at: Instant,
}

impl Toast {
    pub fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            id: None,
            level,
            message: message.into(),
            created_at: Instant::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Short-lived notifications, newest last.
#[derive(Debug)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    lifetime: Duration,
    max_visible: usize,
}

impl ToastQueue {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            lifetime,
            max_visible: 4,
        }
    }

    /// Add a toast. One carrying an id already on screen replaces it in place.
    pub fn push(&mut self, toast: Toast) {
        if let Some(id) = toast.id.as_deref() {
            if let Some(existing) = self
                .toasts
                .iter_mut()
                .find(|t| t.id.as_deref() == Some(id))
            {
                *existing = toast;
                return;
            }
        }

        self.toasts.push(toast);
        if self.toasts.len() > self.max_visible {
            let overflow = self.toasts.len() - self.max_visible;
            self.toasts.drain(..overflow);
        }
    }

    pub fn notify(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.push(Toast::new(level, message));
    }

    pub fn prune(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.toasts
            .retain(|t| now.saturating_duration_since(t.created_at) < lifetime);
    }

    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
