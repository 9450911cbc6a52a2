//! Canned evaluation cases
//!
//! Each case sends a fixed prompt and scores the response by keyword
//! coverage. Forbidden keywords fail a case even when every expected
//! keyword is present.

/// One evaluation case
#[derive(Debug, Clone, Copy)]
pub struct EvalCase {
    pub category: &'static str,
    pub name: &'static str,
    pub prompt: &'static str,
    pub expected_keywords: &'static [&'static str],
    pub forbidden_keywords: &'static [&'static str],
}

/// Category names in presentation order
pub const CATEGORIES: &[&str] = &[
    "Basic Commands",
    "Code Explanation",
    "Debugging",
    "Optimization",
    "Best Practices",
    "Edge Cases",
];

/// The full case table
pub const EVAL_CASES: &[EvalCase] = &[
    // Basic Commands
    EvalCase {
        category: "Basic Commands",
        name: "Regression command",
        prompt: "What does \"regress mpg weight length\" do in Stata?",
        expected_keywords: &["regression", "mpg", "dependent", "independent", "weight", "length"],
        forbidden_keywords: &[],
    },
    EvalCase {
        category: "Basic Commands",
        name: "Summarize command",
        prompt: "Explain \"summarize price, detail\" in Stata",
        expected_keywords: &["summary", "statistics", "detail", "percentile", "mean"],
        forbidden_keywords: &[],
    },
    EvalCase {
        category: "Basic Commands",
        name: "Generate command",
        prompt: "What does \"generate newvar = oldvar * 2\" do?",
        expected_keywords: &["create", "new", "variable", "multiply", "double"],
        forbidden_keywords: &[],
    },
    EvalCase {
        category: "Basic Commands",
        name: "Merge command",
        prompt: "Explain \"merge 1:1 id using dataset2\"",
        expected_keywords: &["merge", "combine", "id", "one-to-one", "match"],
        forbidden_keywords: &[],
    },
    // Code Explanation
    EvalCase {
        category: "Code Explanation",
        name: "Loop explanation",
        prompt: "Explain this Stata code:\nforeach var of varlist price mpg weight {\n    summarize `var'\n}",
        expected_keywords: &["loop", "iterate", "each", "variable", "summarize"],
        forbidden_keywords: &[],
    },
    EvalCase {
        category: "Code Explanation",
        name: "Conditional logic",
        prompt: "Explain: replace price = . if price < 0",
        expected_keywords: &["replace", "missing", "conditional", "negative", "if"],
        forbidden_keywords: &[],
    },
    EvalCase {
        category: "Code Explanation",
        name: "Data transformation",
        prompt: "What does this do: bysort company year: egen mean_sales = mean(sales)",
        expected_keywords: &["group", "sort", "average", "mean", "company", "year"],
        forbidden_keywords: &[],
    },
    // Debugging
    EvalCase {
        category: "Debugging",
        name: "Missing variable issue",
        prompt: "Debug this code: regress price mpg weigth (note: weigth is misspelled)",
        expected_keywords: &["typo", "misspell", "weight", "variable", "not found"],
        forbidden_keywords: &[],
    },
    EvalCase {
        category: "Debugging",
        name: "Syntax error",
        prompt: "Fix this: generate newvar = if price > 1000",
        expected_keywords: &["missing", "value", "expression", "condition", "syntax"],
        forbidden_keywords: &[],
    },
    EvalCase {
        category: "Debugging",
        name: "Logic error",
        prompt: "What's wrong: replace age = 0 if age > 100 (should set to missing)",
        expected_keywords: &["missing", "should", "invalid", "outlier", "better"],
        forbidden_keywords: &[],
    },
    // Optimization
    EvalCase {
        category: "Optimization",
        name: "Inefficient loop",
        prompt: "Optimize: foreach i of numlist 1/100 { generate var`i' = 0 }",
        expected_keywords: &["efficient", "better", "alternative", "faster", "reshape"],
        forbidden_keywords: &[],
    },
    EvalCase {
        category: "Optimization",
        name: "Redundant operations",
        prompt: "Improve: sort id\nsort id year\nsort id",
        expected_keywords: &["redundant", "unnecessary", "single", "once", "remove"],
        forbidden_keywords: &[],
    },
    // Best Practices
    EvalCase {
        category: "Best Practices",
        name: "Variable naming",
        prompt: "Is \"Price_2024\" a good Stata variable name? Suggest improvements.",
        expected_keywords: &["lowercase", "convention", "better", "price_2024", "underscore"],
        forbidden_keywords: &[],
    },
    EvalCase {
        category: "Best Practices",
        name: "Data preservation",
        prompt: "Should I use preserve/restore when making temporary changes?",
        expected_keywords: &["yes", "preserve", "restore", "temporary", "revert"],
        forbidden_keywords: &["no", "never", "don't"],
    },
    EvalCase {
        category: "Best Practices",
        name: "Missing values",
        prompt: "How should I handle missing values before analysis?",
        expected_keywords: &["check", "missing", "drop", "impute", "understand"],
        forbidden_keywords: &[],
    },
    // Edge Cases
    EvalCase {
        category: "Edge Cases",
        name: "Complex merge",
        prompt: "How do I merge datasets with non-unique identifiers?",
        expected_keywords: &["many-to-many", "m:m", "duplicate", "careful", "issue"],
        forbidden_keywords: &[],
    },
    EvalCase {
        category: "Edge Cases",
        name: "Panel data",
        prompt: "How do I declare panel data structure in Stata?",
        expected_keywords: &["xtset", "panel", "time", "id", "declare"],
        forbidden_keywords: &[],
    },
];
