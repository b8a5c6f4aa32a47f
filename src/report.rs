//! Plain-text diagnostics report.

use crate::diagnostics::{Diagnostic, Severity};
use unicode_width::UnicodeWidthStr;

const HEADERS: [&str; 5] = ["SEVERITY", "CODE", "FILE", "LOCATION", "MESSAGE"];

/// Aligned table of `diagnostics` followed by a summary line.
pub fn render_text(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    if diagnostics.is_empty() {
        out.push_str("no issues found\n");
        return out;
    }

    let rows: Vec<[String; 5]> = diagnostics
        .iter()
        .map(|d| {
            let mut message = d.message.clone();
            if let Some(hint) = &d.hint {
                message.push_str(&format!(" (hint: {hint})"));
            }
            [
                d.severity.to_string(),
                d.code.clone(),
                d.file.clone().unwrap_or_default(),
                d.location(),
                message,
            ]
        })
        .collect();

    let mut widths = HEADERS.map(UnicodeWidthStr::width);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.width());
        }
    }

    push_row(&mut out, &HEADERS, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out.push('\n');
    out.push_str(&summary(diagnostics));
    out.push('\n');
    out
}

/// Counts per severity, e.g. `1 error, 2 warnings, 0 info`.
pub fn summary(diagnostics: &[Diagnostic]) -> String {
    let count = |s: Severity| diagnostics.iter().filter(|d| d.severity == s).count();
    let errors = count(Severity::Error);
    let warnings = count(Severity::Warning);
    format!(
        "{} error{}, {} warning{}, {} info",
        errors,
        if errors == 1 { "" } else { "s" },
        warnings,
        if warnings == 1 { "" } else { "s" },
        count(Severity::Info)
    )
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        let cell = cell.as_ref();
        out.push_str(cell);
        if i < last {
            let pad = width.saturating_sub(cell.width()) + 2;
            out.extend(std::iter::repeat_n(' ', pad));
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Category;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_report() {
        assert_eq!(render_text(&[]), "no issues found\n");
    }

    #[test]
    fn test_columns_aligned() {
        let diags = vec![
            Diagnostic::warning(Category::MissingPrimaryKey, "table `logs` has no primary key")
                .with_table("logs")
                .with_file("logs.sql"),
            Diagnostic::info(Category::OrphanTable, "table `ユーザー` has no relationships")
                .with_table("ユーザー")
                .with_file("a.sql"),
        ];
        let text = render_text(&diags);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "SEVERITY  CODE  FILE      LOCATION  MESSAGE"
        );
        assert_eq!(
            lines[1],
            "warning   A003  logs.sql  logs      table `logs` has no primary key"
        );
        assert_eq!(
            lines[2],
            "info      A001  a.sql     ユーザー  table `ユーザー` has no relationships"
        );
        assert_eq!(lines[4], "0 errors, 1 warning, 1 info");
    }

    #[test]
    fn test_hint_appended() {
        let diags = vec![Diagnostic::warning(Category::MissingFkIndex, "unindexed")
            .with_hint("CREATE INDEX ON t (c);")];
        assert!(render_text(&diags).contains("unindexed (hint: CREATE INDEX ON t (c);)"));
    }
}
