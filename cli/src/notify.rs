use std::fmt;

use crate::api::UploadResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Info,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Level::Success => "ok",
            Level::Error => "error",
            Level::Info => "info",
        }
    }
}

/// A one-line message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Level::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    /// Print to stdout, or stderr for errors.
    pub fn emit(&self) {
        match self.level {
            Level::Error => eprintln!("{self}"),
            _ => println!("{self}"),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.label(), self.message)
    }
}

/// Summary notifications for a finished upload. Locally rejected files count
/// as failures.
pub fn upload_notifications(results: &[UploadResult], rejected_locally: usize) -> Vec<Notification> {
    let succeeded = results
        .iter()
        .filter(|r| matches!(r, UploadResult::Success { .. }))
        .count();
    let failed = results.len() - succeeded + rejected_locally;

    let mut out = Vec::new();
    if succeeded > 0 {
        out.push(Notification::success(format!(
            "{succeeded} document(s) uploaded successfully!"
        )));
    }
    if failed > 0 {
        out.push(Notification::error(format!(
            "{failed} document(s) failed to upload."
        )));
    }
    out
}

pub fn search_summary(count: usize) -> Notification {
    Notification::info(format!("Found {count} results."))
}
