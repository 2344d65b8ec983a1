//! Terminal display utilities for CLI output.

use std::io::{self, IsTerminal};

/// Widest cell rendered in terminal tables
pub const MAX_CELL_WIDTH: usize = 40;

/// Check if stdout is a terminal.
#[inline]
pub fn is_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Truncate text to fit within the specified width using unicode-aware truncation.
///
/// Appends an ellipsis when truncation occurred.
///
/// # Examples
///
/// ```
/// use sirene_search::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("BOULANGERIE", 8), "BOULA...");
/// assert_eq!(truncate_with_ellipsis("SNCF", 8), "SNCF");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    let char_widths: Vec<(char, usize)> = text
        .chars()
        .map(|c| (c, unicode_width::UnicodeWidthChar::width(c).unwrap_or(1)))
        .collect();

    let total_width: usize = char_widths.iter().map(|(_, w)| *w).sum();
    if total_width <= max_width {
        return text.to_string();
    }

    let mut current_width = 0;
    let mut end_idx = 0;
    for (i, (_c, w)) in char_widths.iter().enumerate() {
        // 3 columns are kept for the ellipsis
        if current_width + w > max_width.saturating_sub(3) {
            break;
        }
        current_width += w;
        end_idx = i + 1;
    }

    if end_idx == 0 {
        return "...".to_string();
    }

    let truncated: String = char_widths[..end_idx].iter().map(|(c, _)| *c).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_with_ellipsis("PARIS 1ER", 20), "PARIS 1ER");
    }

    #[test]
    fn test_truncate_long_text() {
        let out = truncate_with_ellipsis("SOCIETE NATIONALE SNCF", 10);
        assert_eq!(out, "SOCIETE...");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK char is two columns wide
        assert_eq!(truncate_with_ellipsis("日本語テキスト", 7), "日本...");
    }

    #[test]
    fn test_truncate_zero_width() {
        assert_eq!(truncate_with_ellipsis("abc", 0), "");
        assert_eq!(truncate_with_ellipsis("abcdef", 2), "...");
    }
}
