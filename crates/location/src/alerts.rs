//! User-facing prompts owned by the location service.
//!
//! Only this service may show these two prompts; the rest of the app
//! consumes its results silently. The UI layer supplies the sink that
//! actually renders them.

use tracing::info;

/// The two prompts this service can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAlert {
    /// Positioning permission is missing before a one-shot fix
    PermissionRequired,
    /// The platform failed to produce a fix
    PositionUnavailable,
}

impl UserAlert {
    /// Prompt title, in the app locale.
    pub fn title(&self) -> &'static str {
        match self {
            UserAlert::PermissionRequired => "إذن الموقع مطلوب",
            UserAlert::PositionUnavailable => "خطأ",
        }
    }

    /// Prompt body, in the app locale.
    pub fn message(&self) -> &'static str {
        match self {
            UserAlert::PermissionRequired => {
                "يحتاج التطبيق للوصول لموقعك لإظهار المطاعم القريبة وتتبع التوصيل."
            }
            UserAlert::PositionUnavailable => "لا يمكن الحصول على موقعك الحالي",
        }
    }
}

/// Receives the prompts this service raises, typically the UI layer.
pub trait AlertSink: Send + Sync {
    /// Show a blocking informational prompt to the user.
    fn show(&self, alert: UserAlert);
}

impl<T: AlertSink + ?Sized> AlertSink for std::sync::Arc<T> {
    fn show(&self, alert: UserAlert) {
        (**self).show(alert);
    }
}

/// Sink that only logs, for headless callers and tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn show(&self, alert: UserAlert) {
        info!(title = alert.title(), message = alert.message(), "User alert");
    }
}
