use regex::Regex;
use std::sync::LazyLock;

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*_#`]").expect("markup pattern is a valid regex"));

/// Drops Markdown control characters (`*`, `_`, `#`, backtick) and trims the
/// result, so replies render as plain pre-formatted text. Line breaks inside
/// the reply are kept.
pub fn strip_formatting(raw: &str) -> String {
    MARKUP.replace_all(raw, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_markdown_characters() {
        assert_eq!(strip_formatting("**Hello** #there"), "Hello there");
        assert_eq!(strip_formatting("`code` and __under__"), "code and under");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(strip_formatting("  \n## Title\n"), "Title");
    }

    #[test]
    fn test_keeps_inner_line_breaks() {
        assert_eq!(
            strip_formatting("* first\n* second"),
            "first\n second"
        );
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(strip_formatting("It depends."), "It depends.");
        assert_eq!(strip_formatting("***"), "");
    }
}
