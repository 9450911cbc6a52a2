//! Stata code reindentation

/// Spaces per indent level
const INDENT: &str = "    ";

/// Reindent Stata code by brace/loop nesting depth.
///
/// A trimmed line starting with `}` drops one level before it is emitted;
/// a trimmed line ending with `{` or starting with `foreach`/`forvalues`
/// adds one level after. Both can fire on the same line, in that order.
/// Empty lines are preserved without indentation.
pub fn format_code(code: &str) -> String {
    let mut formatted: Vec<String> = Vec::new();
    let mut indent_level: usize = 0;

    for line in code.split('\n') {
        let trimmed = line.trim();

        if trimmed.starts_with('}') {
            indent_level = indent_level.saturating_sub(1);
        }

        if trimmed.is_empty() {
            formatted.push(String::new());
        } else {
            formatted.push(format!("{}{}", INDENT.repeat(indent_level), trimmed));
        }

        if trimmed.ends_with('{')
            || trimmed.starts_with("foreach")
            || trimmed.starts_with("forvalues")
        {
            indent_level += 1;
        }
    }

    formatted.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_body_indented() {
        let formatted = format_code("foreach var in x1 x2 {\nsummarize `var'\n}");
        assert_eq!(formatted, "foreach var in x1 x2 {\n    summarize `var'\n}");
    }

    #[test]
    fn test_close_then_open_on_one_line() {
        // "} else {" drops a level before emit and re-opens after
        let formatted = format_code("if a {\nx = 1\n} else {\ny = 2\n}");
        assert_eq!(formatted, "if a {\n    x = 1\n} else {\n    y = 2\n}");
    }

    #[test]
    fn test_empty_input_unchanged() {
        assert_eq!(format_code(""), "");
    }
}
