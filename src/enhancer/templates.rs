//! Static prompt text for the enhancer
//!
//! The domain context and the command catalog are immutable process-wide
//! constants; everything that builds prompts reads them, nothing writes them.

/// Stata programming context prepended to every prompt
pub const STATA_CONTEXT: &str = "You are a Stata programming assistant. Stata is a statistical software package \nused for data analysis, data management, and graphics. When helping with Stata code:\n\n1. Use proper Stata syntax and conventions\n2. Consider data management best practices\n3. Be aware of common Stata commands and their options\n4. Provide clear, efficient, and well-commented code\n5. Consider memory efficiency and performance\n6. Follow Stata's naming conventions (lowercase for variables and commands)\n7. Use appropriate data types and formats\n8. Consider using -preserve- and -restore- when making temporary changes";

/// Introductory line inserted when the user text appears to contain code
pub const CODE_PREAMBLE: &str = "Here is the Stata code to analyze:\n\n";

/// Common Stata commands with one-line descriptions. Informational only:
/// shown in help output, never consulted by the detection heuristic.
pub const COMMAND_CATALOG: &[(&str, &str)] = &[
    ("regress", "Linear regression"),
    ("summarize", "Summary statistics"),
    ("tabulate", "Frequency tables"),
    ("generate", "Create new variables"),
    ("replace", "Replace variable values"),
    ("drop", "Drop variables or observations"),
    ("keep", "Keep variables or observations"),
    ("merge", "Merge datasets"),
    ("append", "Append datasets"),
    ("collapse", "Make dataset of summary statistics"),
    ("reshape", "Convert data from wide to long or vice versa"),
    ("foreach", "Loop over items"),
    ("forvalues", "Loop over consecutive values"),
    ("if", "Conditional execution"),
    ("egen", "Extensions to generate"),
    ("bysort", "Sort and process by groups"),
];

/// Canned task templates shared by the REPL and the web command routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskTemplate {
    Explain,
    Fix,
    Optimize,
}

impl TaskTemplate {
    /// Parse a command name ("explain", "fix", "optimize")
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "explain" => Some(Self::Explain),
            "fix" => Some(Self::Fix),
            "optimize" => Some(Self::Optimize),
            _ => None,
        }
    }

    /// Wrap a code snippet in the template's fixed English sentence
    pub fn render(&self, code: &str) -> String {
        match self {
            Self::Explain => format!("Please explain this Stata code:\n\n{}", code),
            Self::Fix => format!("Please debug and fix this Stata code:\n\n{}", code),
            Self::Optimize => {
                format!("Please suggest optimizations for this Stata code:\n\n{}", code)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_keys_unique_and_lowercase() {
        let mut seen = HashSet::new();
        for (name, desc) in COMMAND_CATALOG {
            assert!(seen.insert(*name), "duplicate catalog entry: {}", name);
            assert_eq!(*name, name.to_lowercase());
            assert!(!desc.is_empty());
        }
        assert!(!COMMAND_CATALOG.is_empty());
    }

    #[test]
    fn test_task_template_names() {
        assert_eq!(TaskTemplate::from_name("explain"), Some(TaskTemplate::Explain));
        assert_eq!(TaskTemplate::from_name("fix"), Some(TaskTemplate::Fix));
        assert_eq!(TaskTemplate::from_name("optimize"), Some(TaskTemplate::Optimize));
        assert_eq!(TaskTemplate::from_name("translate"), None);
    }
}
