//! User-facing message sinks.
//!
//! Two kinds of sinks exist: short-lived toasts shown inside the session,
//! and notifications, which are gated by a permission the same way desktop
//! notifications are. Both are injected so the editor and the scheduler can
//! run without a terminal attached.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

/// Fire-and-forget toasts.
pub trait Toaster: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn info(&self, message: &str);
}

/// The answer to a notification permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Not asked yet.
    Default,
}

/// A platform service able to display notifications.
pub trait NotificationBackend: Send + Sync {
    fn permission(&self) -> Permission;
    fn request_permission(&self) -> Permission;
    fn show(&self, message: &str);
}

/// What happened to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Shown,
    Dropped,
    Unsupported,
}

/// The notification capability, which may be missing altogether.
#[derive(Clone)]
pub enum Notifier {
    Available(Arc<dyn NotificationBackend>),
    Unavailable,
}

impl Notifier {
    /// Show a notification. Permission is requested first when it has not
    /// been granted yet; the message is dropped unless it is granted then.
    pub fn notify(&self, message: &str) -> Delivery {
        match self {
            Notifier::Unavailable => {
                warn!("notifications are not supported here, dropping: {}", message);
                Delivery::Unsupported
            }
            Notifier::Available(backend) => {
                if backend.permission() == Permission::Granted
                    || backend.request_permission() == Permission::Granted
                {
                    backend.show(message);
                    Delivery::Shown
                } else {
                    debug!("notification permission not granted, dropping: {}", message);
                    Delivery::Dropped
                }
            }
        }
    }
}

/// Toasts printed on standard output.
#[derive(Debug, Default)]
pub struct ConsoleToaster;

impl ConsoleToaster {
    fn print(&self, marker: &str, message: &str) {
        // stdout is not locked for long anywhere, timers print from other threads.
        let mut out = std::io::stdout();
        let _ = writeln!(out, "{} {}", marker, message);
        let _ = out.flush();
    }
}

impl Toaster for ConsoleToaster {
    fn success(&self, message: &str) {
        self.print("[ok]", message);
    }

    fn error(&self, message: &str) {
        self.print("[error]", message);
    }

    fn info(&self, message: &str) {
        self.print("[info]", message);
    }
}

/// Notifications rendered as a terminal bell plus a line on stderr.
#[derive(Debug)]
pub struct TerminalBell {
    permission: Mutex<Permission>,
    answer: Permission,
}

impl TerminalBell {
    /// `answer` is what a permission request resolves to.
    pub fn new(answer: Permission) -> Self {
        TerminalBell {
            permission: Mutex::new(Permission::Default),
            answer,
        }
    }
}

impl NotificationBackend for TerminalBell {
    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn request_permission(&self) -> Permission {
        let mut permission = self.permission.lock().unwrap_or_else(|e| e.into_inner());
        if *permission == Permission::Default {
            *permission = self.answer;
        }
        *permission
    }

    fn show(&self, message: &str) {
        let mut err = std::io::stderr();
        let _ = writeln!(err, "\x07[notification] {}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

/// A toaster that keeps everything it is given. Useful when embedding the
/// editor somewhere without a terminal, and in tests.
#[derive(Debug, Default)]
pub struct MemoryToaster {
    toasts: Mutex<Vec<(ToastLevel, String)>>,
}

impl MemoryToaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<(ToastLevel, String)> {
        self.toasts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn messages(&self, level: ToastLevel) -> Vec<String> {
        self.toasts()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    fn push(&self, level: ToastLevel, message: &str) {
        self.toasts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message.to_string()));
    }
}

impl Toaster for MemoryToaster {
    fn success(&self, message: &str) {
        self.push(ToastLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.push(ToastLevel::Error, message);
    }

    fn info(&self, message: &str) {
        self.push(ToastLevel::Info, message);
    }
}

/// A notification backend that records what it shows.
#[derive(Debug)]
pub struct MemoryBackend {
    permission: Mutex<Permission>,
    answer: Permission,
    shown: Mutex<Vec<String>>,
}

impl MemoryBackend {
    pub fn new(permission: Permission, answer: Permission) -> Self {
        MemoryBackend {
            permission: Mutex::new(permission),
            answer,
            shown: Mutex::new(Vec::new()),
        }
    }

    /// Permission already granted.
    pub fn granted() -> Self {
        Self::new(Permission::Granted, Permission::Granted)
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl NotificationBackend for MemoryBackend {
    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn request_permission(&self) -> Permission {
        let mut permission = self.permission.lock().unwrap_or_else(|e| e.into_inner());
        if *permission == Permission::Default {
            *permission = self.answer;
        }
        *permission
    }

    fn show(&self, message: &str) {
        self.shown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granted_backend_shows_right_away() {
        let backend = Arc::new(MemoryBackend::granted());
        let notifier = Notifier::Available(backend.clone());

        assert_eq!(notifier.notify("hello"), Delivery::Shown);
        assert_eq!(backend.shown(), vec!["hello".to_string()]);
    }

    #[test]
    fn permission_is_requested_before_showing() {
        let backend = Arc::new(MemoryBackend::new(Permission::Default, Permission::Granted));
        let notifier = Notifier::Available(backend.clone());

        assert_eq!(notifier.notify("first"), Delivery::Shown);
        assert_eq!(backend.permission(), Permission::Granted);
        assert_eq!(backend.shown(), vec!["first".to_string()]);
    }

    #[test]
    fn refused_permission_drops_the_message() {
        let backend = Arc::new(MemoryBackend::new(Permission::Default, Permission::Denied));
        let notifier = Notifier::Available(backend.clone());

        assert_eq!(notifier.notify("nope"), Delivery::Dropped);
        assert!(backend.shown().is_empty());
    }

    #[test]
    fn missing_capability_is_not_an_error() {
        assert_eq!(Notifier::Unavailable.notify("x"), Delivery::Unsupported);
    }

    #[test]
    fn terminal_bell_remembers_the_answer() {
        let bell = TerminalBell::new(Permission::Denied);
        assert_eq!(bell.permission(), Permission::Default);
        assert_eq!(bell.request_permission(), Permission::Denied);
        assert_eq!(bell.permission(), Permission::Denied);
    }
}
