//! 進捗・診断メッセージ

use std::fmt;
use std::sync::Mutex;

use tracing::{error, info, warn};

use crate::traits::ProgressReporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Progress,
    Success,
    Warning,
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticLevel::Progress => "progress",
            DiagnosticLevel::Success => "success",
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

/// tracing にそのまま流す
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, level: DiagnosticLevel, message: &str) {
        match level {
            DiagnosticLevel::Progress | DiagnosticLevel::Success => info!("{}", message),
            DiagnosticLevel::Warning => warn!("{}", message),
            DiagnosticLevel::Error => error!("{}", message),
        }
    }
}

/// メッセージを保持しつつ tracing にも出力する
#[derive(Debug, Default)]
pub struct CollectingReporter {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self, level: DiagnosticLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|d| d.level == level)
            .map(|d| d.message)
            .collect()
    }
}

impl ProgressReporter for CollectingReporter {
    fn report(&self, level: DiagnosticLevel, message: &str) {
        TracingReporter.report(level, message);
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(Diagnostic {
                level,
                message: message.to_string(),
            });
        }
    }
}
