//! Diagnostic, severity and report types shared by every checker rule.
//!
//! Grounded on `issues.rs`'s `Issue`/`Report`/`Severity` `enum_dispatch`
//! pattern: rather than one big `Issue` enum per rule family, every rule
//! produces the same flat [`Diagnostic`] shape, tagged by `code`.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::ast::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Off,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Off => write!(f, "off"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One diagnostic produced by a rule, already resolved against configured
/// severity overrides and with a file-absolute location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    pub severity: Severity,
    pub file: String,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
}

impl Diagnostic {
    pub fn new(code: &'static str, message: impl Into<String>, severity: Severity, file: impl Into<String>, location: Location) -> Self {
        Self {
            code,
            message: message.into(),
            severity,
            file: file.into(),
            location,
            data: None,
        }
    }

    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.get_or_insert_with(HashMap::new).insert(key.to_string(), value.into());
        self
    }
}

/// A flat diagnostic list plus summary counts, sorted deterministically by
/// file, then line, then column - matching the report printer's ordering
/// contract.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new(mut diagnostics: Vec<Diagnostic>) -> Self {
        diagnostics.sort_by(compare_diagnostics);
        Self { diagnostics }
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

fn compare_diagnostics(a: &Diagnostic, b: &Diagnostic) -> Ordering {
    a.file
        .cmp(&b.file)
        .then_with(|| a.location.start_position.row.cmp(&b.location.start_position.row))
        .then_with(|| a.location.start_position.column.cmp(&b.location.start_position.column))
        .then_with(|| a.code.cmp(b.code))
}

/// Per-rule severity overrides, keyed by rule id. Rules absent from this map
/// use their own `default_severity()`.
pub type SeverityConfig = HashMap<String, Severity>;
