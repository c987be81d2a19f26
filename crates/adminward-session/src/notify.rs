//! User-facing notification seam.
//!
//! The core never renders anything. When it needs the operator to see
//! something (a failed request, an expired session) it goes through a
//! [`Notifier`], and the host decides what that looks like.

use std::future::Future;
use std::time::Duration;

/// How loud a notice is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Error,
    Warning,
    Info,
}

/// A transient notification (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// How long the host should keep it on screen.
    pub duration: Duration,
}

impl Notice {
    /// Default on-screen time for a notice.
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            duration: Self::DEFAULT_DURATION,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// A blocking confirmation the operator has to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl Default for Prompt {
    /// The re-login prompt shown when a call comes back `401`.
    fn default() -> Self {
        Self {
            title: "确认登出".into(),
            message: "您已登出，可以取消以停留在此页面，或者重新登录".into(),
            confirm_label: "重新登录".into(),
            cancel_label: "取消".into(),
        }
    }
}

/// Shows notices and prompts to the operator.
pub trait Notifier: Send + Sync + 'static {
    /// Shows a transient notice. Must not block.
    fn notify(&self, notice: Notice);

    /// Shows `prompt` and resolves to `true` if the operator confirmed.
    fn confirm(&self, prompt: &Prompt) -> impl Future<Output = bool> + Send;
}

/// A [`Notifier`] for headless hosts: every notice becomes a log line and
/// every prompt is answered with a fixed value.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    confirm_answer: bool,
}

impl LogNotifier {
    /// A notifier that confirms every prompt.
    pub fn new() -> Self {
        Self {
            confirm_answer: true,
        }
    }

    /// Sets the answer given to every prompt.
    pub fn answering(mut self, confirm: bool) -> Self {
        self.confirm_answer = confirm;
        self
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        let secs = notice.duration.as_secs_f32();
        match notice.level {
            NoticeLevel::Error => tracing::error!(duration_secs = secs, "{}", notice.message),
            NoticeLevel::Warning => tracing::warn!(duration_secs = secs, "{}", notice.message),
            NoticeLevel::Info => tracing::info!(duration_secs = secs, "{}", notice.message),
        }
    }

    async fn confirm(&self, prompt: &Prompt) -> bool {
        tracing::warn!(
            title = %prompt.title,
            answer = self.confirm_answer,
            "{}",
            prompt.message
        );
        self.confirm_answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_error_uses_default_duration() {
        let notice = Notice::error("boom");

        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.duration, Duration::from_secs(5));
        assert_eq!(
            notice.with_duration(Duration::from_secs(1)).duration,
            Duration::from_secs(1)
        );
    }

    #[tokio::test]
    async fn test_log_notifier_confirm_returns_configured_answer() {
        let prompt = Prompt::default();

        assert!(LogNotifier::new().confirm(&prompt).await);
        assert!(!LogNotifier::new().answering(false).confirm(&prompt).await);
    }
}
