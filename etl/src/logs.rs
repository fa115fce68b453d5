//! Pipeline notices and progress logging.
//!
//! Stages report through the `log_*` helpers below. Every entry becomes a
//! `tracing` event so the binary decides formatting and filtering in one
//! place ([`init`]). Embedding applications can install their own subscriber.
//!
//! At the default `info` level a run prints only the output-file notices
//! and warnings. Progress lines are `debug` (`RUST_LOG=debug`).

use tracing_subscriber::{fmt, EnvFilter};

/// Log level for pipeline notices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Stage progress, hidden at the default level
    Progress,
    Info,
    Success,
    Warning,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth for sub-step lines
    pub indent: u8,
}

impl LogEntry {
    pub fn progress(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Progress, message: message.into(), indent: 0 }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Message with its indentation applied.
    pub fn render(&self) -> String {
        format!("{}{}", "   ".repeat(self.indent as usize), self.message)
    }

    /// Emit this entry as a `tracing` event.
    pub fn emit(&self) {
        let line = self.render();
        match self.level {
            LogLevel::Progress => tracing::debug!("{}", line),
            LogLevel::Info => tracing::info!("{}", line),
            LogLevel::Success => tracing::info!(status = "ok", "{}", line),
            LogLevel::Warning => tracing::warn!("{}", line),
        }
    }
}

pub fn log_progress(msg: impl Into<String>) {
    LogEntry::progress(msg).emit();
}

pub fn log_progress_indent(msg: impl Into<String>, indent: u8) {
    LogEntry::progress(msg).with_indent(indent).emit();
}

pub fn log_info(msg: impl Into<String>) {
    LogEntry::info(msg).emit();
}

pub fn log_success(msg: impl Into<String>) {
    LogEntry::success(msg).emit();
}

pub fn log_warning(msg: impl Into<String>) {
    LogEntry::warning(msg).emit();
}

/// Install the stdout subscriber used by the binary.
///
/// Honors `RUST_LOG`, defaulting to `info`. Calling it twice is harmless.
pub fn init() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .without_time()
        .compact()
        .try_init();
}

/// Run `f` under a scoped subscriber at the binary's default level and
/// return what it logged.
#[cfg(test)]
pub(crate) fn capture<T>(f: impl FnOnce() -> T) -> (T, String) {
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::new("info"))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    (out, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_indent() {
        let entry = LogEntry::progress("Rows: 3").with_indent(2);
        assert_eq!(entry.render(), "      Rows: 3");
    }

    #[test]
    fn test_constructors_set_level() {
        assert_eq!(LogEntry::progress("x").level, LogLevel::Progress);
        assert_eq!(LogEntry::success("x").level, LogLevel::Success);
        assert_eq!(LogEntry::warning("x").level, LogLevel::Warning);
    }

    #[test]
    fn test_progress_hidden_at_default_level() {
        let ((), text) = capture(|| {
            log_progress("Fetching");
            log_progress_indent("12 rows", 1);
            log_info("'out.csv' already exists");
            log_warning("page 1 of 2");
        });
        assert!(!text.contains("Fetching"));
        assert!(!text.contains("12 rows"));
        assert!(text.contains("'out.csv' already exists"));
        assert!(text.contains("page 1 of 2"));
    }

    #[test]
    fn test_emit_without_subscriber() {
        // No subscriber installed: events are dropped silently.
        log_success("saved");
        log_warning("replacing");
    }
}
