//! Coarse Stata syntax validation

use std::sync::LazyLock;

use regex::Regex;

/// Stata local macro reference: backtick-quoted, apostrophe-closed. These
/// spans are discounted before the apostrophe parity check so `var' style
/// locals do not read as unclosed quotes.
static LOCAL_MACRO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`']*'").expect("local macro regex"));

/// Outcome of a syntax check. A failed check is a value, not an error; the
/// message is present only when `is_valid` is false and is surfaced to the
/// user verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxCheck {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl SyntaxCheck {
    fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn fail(message: String) -> Self {
        Self {
            is_valid: false,
            error: Some(message),
        }
    }
}

/// Validate brace balance and quote pairing.
///
/// Braces are counted over the whole text; quotes are checked per trimmed
/// line, so a quote pair spanning two lines is reported on the first line.
/// The first failing condition wins.
pub fn validate_syntax(code: &str) -> SyntaxCheck {
    let open_braces = code.matches('{').count();
    let close_braces = code.matches('}').count();

    if open_braces != close_braces {
        return SyntaxCheck::fail(format!(
            "Unbalanced braces: {} opening, {} closing",
            open_braces, close_braces
        ));
    }

    for (i, line) in code.split('\n').enumerate() {
        let trimmed = line.trim();

        if trimmed.matches('"').count() % 2 != 0 {
            return SyntaxCheck::fail(format!("Unclosed quote on line {}", i + 1));
        }

        let without_locals = LOCAL_MACRO_RE.replace_all(trimmed, "");
        if without_locals.matches('\'').count() % 2 != 0 {
            return SyntaxCheck::fail(format!("Unclosed quote on line {}", i + 1));
        }
    }

    SyntaxCheck::ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_loop_is_valid() {
        let check = validate_syntax("foreach var of varlist x1 x2 { \n summarize `var' \n }");
        assert!(check.is_valid);
        assert!(check.error.is_none());
    }

    #[test]
    fn test_missing_close_brace() {
        let check = validate_syntax("foreach var of varlist x1 x2 { \n summarize `var'");
        assert!(!check.is_valid);
        assert_eq!(
            check.error.as_deref(),
            Some("Unbalanced braces: 1 opening, 0 closing")
        );
    }

    #[test]
    fn test_unclosed_double_quote() {
        let check = validate_syntax("display \"Hello world");
        assert_eq!(check.error.as_deref(), Some("Unclosed quote on line 1"));
    }

    #[test]
    fn test_unclosed_single_quote() {
        let check = validate_syntax("label var price 'sale price");
        assert_eq!(check.error.as_deref(), Some("Unclosed quote on line 1"));
    }

    #[test]
    fn test_brace_check_wins_over_quotes() {
        // Both problems present; the global brace count is reported first
        let check = validate_syntax("display \"oops {");
        assert_eq!(
            check.error.as_deref(),
            Some("Unbalanced braces: 1 opening, 0 closing")
        );
    }
}
