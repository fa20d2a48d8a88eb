use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a finding reported against submitted source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    SyntaxError,
    ReferenceError,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::SyntaxError => f.write_str("SyntaxError"),
            DiagnosticKind::ReferenceError => f.write_str("ReferenceError"),
        }
    }
}

/// A single issue found on one line of a submission.
///
/// Diagnostics are recomputed on every analysis and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    #[must_use]
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            kind: DiagnosticKind::SyntaxError,
        }
    }

    #[must_use]
    pub fn reference(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            kind: DiagnosticKind::ReferenceError,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.kind, self.message)
    }
}
