//! Prompt Enhancer - core enhancement logic
//!
//! Builds the final prompt sent to the model: the fixed Stata domain context
//! first, then an introductory line when the input looks like Stata code,
//! then the user text unchanged.

use std::sync::LazyLock;

use regex::Regex;

use super::templates::{CODE_PREAMBLE, STATA_CONTEXT};

/// One rule of the code-detection heuristic.
///
/// The list is an explicit table rather than inlined conditionals so new
/// Stata keywords can be added without touching control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePattern {
    /// A command keyword matched as a whole word
    Command(&'static str),
    /// The word `if` followed later by the word `then`
    IfThen,
    /// Standalone `di` or `display`
    Display,
    /// An identifier followed by `=` (variable assignment)
    Assignment,
    /// A `*` comment marker followed by a letter
    LineComment,
}

impl CodePattern {
    /// Regex source for this rule. All rules match case-insensitively and
    /// anywhere in the text.
    fn regex_source(&self) -> String {
        match self {
            Self::Command(word) => format!(r"\b{}\b", word),
            Self::IfThen => r"\bif\b.*\bthen\b".to_string(),
            Self::Display => r"\bdi\b|\bdisplay\b".to_string(),
            Self::Assignment => r"[a-z_]+\s*=\s*".to_string(),
            Self::LineComment => r"\*\s*[A-Za-z]".to_string(),
        }
    }
}

/// The fixed detection rules, in no significant order: the heuristic only
/// reports whether any rule matched.
pub const CODE_PATTERNS: &[CodePattern] = &[
    CodePattern::Command("regress"),
    CodePattern::Command("summarize"),
    CodePattern::Command("generate"),
    CodePattern::Command("tabulate"),
    CodePattern::Command("foreach"),
    CodePattern::Command("forvalues"),
    CodePattern::IfThen,
    CodePattern::Display,
    CodePattern::Assignment,
    CodePattern::LineComment,
];

static COMPILED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CODE_PATTERNS
        .iter()
        .map(|p| {
            Regex::new(&format!("(?i){}", p.regex_source()))
                .expect("code detection pattern must compile")
        })
        .collect()
});

/// Prompt Enhancer
///
/// Holds only references to the immutable constants, so it is free to share
/// across threads and cheap to construct.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptEnhancer;

impl PromptEnhancer {
    pub fn new() -> Self {
        Self
    }

    /// Build the model-ready prompt: domain context, optional code preamble,
    /// then the original text unchanged
    pub fn enhance(&self, text: &str) -> String {
        let mut enhanced = String::with_capacity(STATA_CONTEXT.len() + text.len() + 64);
        enhanced.push_str(STATA_CONTEXT);
        enhanced.push_str("\n\n");

        if self.looks_like_code(text) {
            enhanced.push_str(CODE_PREAMBLE);
        }

        enhanced.push_str(text);
        enhanced
    }

    /// True iff any detection rule matches anywhere in the text
    pub fn looks_like_code(&self, text: &str) -> bool {
        COMPILED_PATTERNS.iter().any(|re| re.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_compiles() {
        assert_eq!(COMPILED_PATTERNS.len(), CODE_PATTERNS.len());
    }

    #[test]
    fn test_command_keywords_detected_case_insensitively() {
        let enhancer = PromptEnhancer::new();
        assert!(enhancer.looks_like_code("REGRESS y x1 x2"));
        assert!(enhancer.looks_like_code("please Summarize price"));
    }

    #[test]
    fn test_plain_prose_not_detected() {
        let enhancer = PromptEnhancer::new();
        assert!(!enhancer.looks_like_code("Hello world"));
        assert!(!enhancer.looks_like_code("How do I analyze data?"));
    }
}
