//! Helpers for cleaning data before it reaches span attributes or
//! spreadsheet cells.

use std::path::Path;

/// Longest string an xlsx cell can hold.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Returns only the filename component of a path (no directory).
///
/// Safe for span fields: reveals the file name without exposing the full path.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Removes control characters that are illegal in xlsx cells and truncates
/// to [`MAX_CELL_CHARS`]. Tab, line feed and carriage return are kept.
pub fn sanitize_cell(value: &str) -> String {
    value
        .chars()
        .filter(|c| !is_illegal_cell_char(*c))
        .take(MAX_CELL_CHARS)
        .collect()
}

fn is_illegal_cell_char(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_path_returns_filename() {
        assert_eq!(
            redact_path(Path::new("/home/user/Documents/report_8000i.pdf")),
            "report_8000i.pdf"
        );
    }

    #[test]
    fn test_redact_path_no_filename() {
        assert_eq!(redact_path(Path::new("/")), "<unknown>");
    }

    #[test]
    fn test_sanitize_cell_strips_control_chars() {
        assert_eq!(sanitize_cell("TASK\u{0}alfa\u{7} 8000i"), "TASKalfa 8000i");
        assert_eq!(sanitize_cell("line1\nline2\tx\r"), "line1\nline2\tx\r");
    }

    #[test]
    fn test_sanitize_cell_truncates() {
        let long = "a".repeat(MAX_CELL_CHARS + 100);
        assert_eq!(sanitize_cell(&long).chars().count(), MAX_CELL_CHARS);
    }
}
