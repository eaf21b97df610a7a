//! Response Normalizer.
//!
//! Model output often wraps the JSON plan in markdown fences or prose. The
//! normalizer strips fences, tries a direct parse, then falls back to the
//! outermost `{` ... `}` span. When both fail the raw text is written to the
//! diagnostics directory so the exact bytes can be inspected later.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::DocumentPlan;

static FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)```json\s*|```").expect("fence pattern is valid")
});

#[derive(Debug, Error)]
pub enum MalformedResponseError {
    #[error("failed to convert response to a JSON plan ({reason}); raw response saved to {}", path.display())]
    Unparseable { path: PathBuf, reason: String },

    #[error("failed to convert response to a JSON plan ({reason}); raw response could not be saved to {}: {source}", path.display())]
    DiagnosticWrite {
        path: PathBuf,
        reason: String,
        #[source]
        source: std::io::Error,
    },
}

impl MalformedResponseError {
    /// Location of the raw-text dump (written or attempted).
    pub fn diagnostic_path(&self) -> &Path {
        match self {
            Self::Unparseable { path, .. } | Self::DiagnosticWrite { path, .. } => path,
        }
    }
}

/// Turns raw completion text into a [`DocumentPlan`].
#[derive(Debug, Clone)]
pub struct Normalizer {
    diagnostics_dir: PathBuf,
}

impl Normalizer {
    pub fn new(diagnostics_dir: impl Into<PathBuf>) -> Self {
        Self {
            diagnostics_dir: diagnostics_dir.into(),
        }
    }

    pub fn diagnostics_dir(&self) -> &Path {
        &self.diagnostics_dir
    }

    /// Dump file used for `context_id`.
    pub fn diagnostic_path(&self, context_id: &str) -> PathBuf {
        self.diagnostics_dir
            .join(format!("raw_response_{}.txt", file_safe(context_id)))
    }

    /// Parse `raw`, recovering from fences and surrounding prose.
    ///
    /// `context_id` names the diagnostic dump written on failure.
    pub fn normalize(&self, raw: &str, context_id: &str) -> Result<DocumentPlan, MalformedResponseError> {
        let cleaned = strip_fences(raw);

        let reason = match parse_plan(&cleaned) {
            Ok(plan) => return Ok(plan),
            Err(direct) => match outermost_object(&cleaned) {
                Some(candidate) => match parse_plan(candidate) {
                    Ok(plan) => {
                        debug!(context = context_id, "Recovered JSON object from surrounding text");
                        return Ok(plan);
                    }
                    Err(e) => e,
                },
                None => direct,
            },
        };

        let path = self.diagnostic_path(context_id);
        if let Err(source) = self.write_dump(&path, raw) {
            return Err(MalformedResponseError::DiagnosticWrite { path, reason, source });
        }
        warn!(context = context_id, path = %path.display(), "Unparseable response saved");
        Err(MalformedResponseError::Unparseable { path, reason })
    }

    fn write_dump(&self, path: &Path, raw: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.diagnostics_dir)?;
        std::fs::write(path, raw)
    }
}

/// Remove ```` ```json ```` / ```` ``` ```` markers anywhere in the text and trim.
fn strip_fences(raw: &str) -> String {
    FENCE_RE.replace_all(raw, "").trim().to_string()
}

/// Span from the first `{` to the last `}`, inclusive.
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Only a top-level JSON object is accepted as a plan.
fn parse_plan(text: &str) -> Result<DocumentPlan, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| format!("JSON parse error: {e}"))?;
    if !value.is_object() {
        return Err("top-level JSON value is not an object".into());
    }
    DocumentPlan::deserialize(value).map_err(|e| format!("unexpected plan shape: {e}"))
}

fn file_safe(context_id: &str) -> String {
    let safe: String = context_id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if safe.trim().is_empty() {
        "response".into()
    } else {
        safe
    }
}
