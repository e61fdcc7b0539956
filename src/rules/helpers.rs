//! Small helpers shared by rule implementations.

use crate::core::ast::Location;
use crate::diagnostics::{Diagnostic, Severity};

pub fn diagnostic(
    code: &'static str,
    message: impl Into<String>,
    severity: Severity,
    file: &str,
    location: Location,
) -> Diagnostic {
    Diagnostic::new(code, message, severity, file, location)
}
