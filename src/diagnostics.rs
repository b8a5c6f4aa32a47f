//! Diagnostics shared by the resolver, the pipeline and the analyzer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, no action required
    Info,
    /// Potential issue worth reviewing
    Warning,
    /// Something in the input could not be used
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Parse,
    UnresolvedReference,
    InvalidForeignKey,
    DuplicateTable,
    UnverifiedReference,
    OrphanTable,
    CircularDependency,
    MissingPrimaryKey,
    NamingConvention,
    MissingFkIndex,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Parse => "parse",
            Category::UnresolvedReference => "unresolved-reference",
            Category::InvalidForeignKey => "invalid-foreign-key",
            Category::DuplicateTable => "duplicate-table",
            Category::UnverifiedReference => "unverified-reference",
            Category::OrphanTable => "orphan-table",
            Category::CircularDependency => "circular-dependency",
            Category::MissingPrimaryKey => "missing-primary-key",
            Category::NamingConvention => "naming-convention",
            Category::MissingFkIndex => "missing-fk-index",
        }
    }

    /// Stable short code: `P` parse, `R` resolution, `A` analysis.
    pub fn code(self) -> &'static str {
        match self {
            Category::Parse => "P001",
            Category::UnresolvedReference => "R001",
            Category::InvalidForeignKey => "R002",
            Category::DuplicateTable => "R003",
            Category::UnverifiedReference => "R004",
            Category::OrphanTable => "A001",
            Category::CircularDependency => "A002",
            Category::MissingPrimaryKey => "A003",
            Category::NamingConvention => "A004",
            Category::MissingFkIndex => "A005",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finding about the input schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic code (e.g. "A002")
    pub code: String,
    pub severity: Severity,
    pub category: Category,
    /// Human-readable message
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Source file the finding is attributed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Optional hint for how to fix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, category: Category, message: impl Into<String>) -> Self {
        Self {
            code: category.code().to_string(),
            severity,
            category,
            message: message.into(),
            table: None,
            column: None,
            file: None,
            hint: None,
        }
    }

    pub fn info(category: Category, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message)
    }

    pub fn warning(category: Category, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    pub fn error(category: Category, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message)
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// `table.column`, `table`, or empty.
    pub fn location(&self) -> String {
        match (&self.table, &self.column) {
            (Some(t), Some(c)) => format!("{t}.{c}"),
            (Some(t), None) => t.clone(),
            (None, _) => String::new(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.code, self.message)
    }
}

/// Most severe first; equal severities keep their relative order.
pub fn sort_by_severity(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| b.severity.cmp(&a.severity));
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}
