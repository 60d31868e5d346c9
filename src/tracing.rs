//! Tracing setup for development diagnostics
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=indicator_formula::suggest=debug` - trigger and popup transitions
//! - `RUST_LOG=indicator_formula::runtime=trace` - fetch scheduling
//!
//! # Log Files
//!
//! Logs are written to `~/.config/indicator-formula/logs/formula.log` with daily rotation.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::model::FormulaModel;

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`) and goes to stderr so
/// it never mixes with the serialized formula on stdout.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "formula.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of the editing session for diffing in traces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub caret: usize,
    pub slots: usize,
    pub open_span: Option<(String, usize, String)>,
    pub candidates: usize,
}

impl SessionSnapshot {
    pub fn from_model(model: &FormulaModel) -> Self {
        Self {
            caret: model.caret,
            slots: model.document.len(),
            open_span: model.triggers.active().and_then(|d| {
                Some((
                    d.kind().to_string(),
                    d.anchor()?,
                    d.query().unwrap_or_default().to_string(),
                ))
            }),
            candidates: model
                .suggestions
                .popup()
                .map(|p| p.candidates.len())
                .unwrap_or(0),
        }
    }

    /// Describe what changed between two snapshots
    pub fn diff(&self, other: &SessionSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.caret != other.caret {
            changes.push(format!("caret: {} → {}", self.caret, other.caret));
        }
        if self.slots != other.slots {
            changes.push(format!("slots: {} → {}", self.slots, other.slots));
        }
        if self.open_span != other.open_span {
            let span = match &other.open_span {
                Some((kind, anchor, query)) => format!("{}@{} '{}'", kind, anchor, query),
                None => "closed".to_string(),
            };
            changes.push(format!("span: {}", span));
        }
        if self.candidates != other.candidates {
            changes.push(format!(
                "candidates: {} → {}",
                self.candidates, other.candidates
            ));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
