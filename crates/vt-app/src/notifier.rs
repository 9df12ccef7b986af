use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Error, message: message.into() }
    }

    pub fn icon(&self) -> &str {
        match self.kind {
            ToastKind::Info => "ℹ",
            ToastKind::Success => "✅",
            ToastKind::Error => "❌",
        }
    }
}

/// Fire-and-forget toasts, each shown for the same fixed duration.
#[derive(Debug)]
pub struct Notifier {
    duration: Duration,
    toasts: VecDeque<(Instant, Toast)>,
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            toasts: VecDeque::new(),
        }
    }

    pub fn notify(&mut self, toast: Toast) {
        self.notify_at(toast, Instant::now());
    }

    pub fn notify_at(&mut self, toast: Toast, now: Instant) {
        self.toasts.push_back((now, toast));
    }

    /// Drops expired toasts and returns the rest, oldest first.
    pub fn active(&mut self, now: Instant) -> Vec<Toast> {
        let duration = self.duration;
        self.toasts
            .retain(|(shown_at, _)| now.saturating_duration_since(*shown_at) < duration);
        self.toasts.iter().map(|(_, toast)| toast.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire_after_duration() {
        let start = Instant::now();
        let mut notifier = Notifier::new(Duration::from_secs(3));
        notifier.notify_at(Toast::error("Upload failed"), start);
        notifier.notify_at(Toast::info("Later"), start + Duration::from_secs(2));

        assert_eq!(notifier.active(start + Duration::from_secs(1)).len(), 2);

        let remaining = notifier.active(start + Duration::from_secs(3));
        assert_eq!(remaining, vec![Toast::info("Later")]);

        assert!(notifier.active(start + Duration::from_secs(6)).is_empty());
        assert!(notifier.is_empty());
    }
}
