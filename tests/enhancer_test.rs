//! Tests for prompt enhancement and code detection

use stata_llama::enhancer::{PromptEnhancer, TaskTemplate, STATA_CONTEXT};

#[test]
fn test_enhanced_prompt_starts_with_context() {
    let enhancer = PromptEnhancer::new();
    let enhanced = enhancer.enhance("How do I load a dataset?");
    assert!(enhanced.starts_with(STATA_CONTEXT));
}

#[test]
fn test_enhanced_prompt_ends_with_original_text() {
    let enhancer = PromptEnhancer::new();
    let text = "regress mpg weight length";
    let enhanced = enhancer.enhance(text);
    assert!(enhanced.ends_with(text));
}

#[test]
fn test_code_input_gets_preamble() {
    let enhancer = PromptEnhancer::new();
    let enhanced = enhancer.enhance("regress mpg weight");
    assert!(enhanced.contains("Here is the Stata code to analyze:"));
}

#[test]
fn test_prose_input_gets_no_preamble() {
    let enhancer = PromptEnhancer::new();
    let enhanced = enhancer.enhance("How do I get started with data analysis?");
    assert!(!enhanced.contains("Here is the Stata code to analyze:"));
}

#[test]
fn test_context_included_exactly_once() {
    let enhancer = PromptEnhancer::new();
    let enhanced = enhancer.enhance("summarize price");
    assert_eq!(enhanced.matches(STATA_CONTEXT).count(), 1);
}

#[test]
fn test_code_detection_commands() {
    let enhancer = PromptEnhancer::new();
    assert!(enhancer.looks_like_code("regress y x1 x2"));
    assert!(enhancer.looks_like_code("summarize price, detail"));
    assert!(enhancer.looks_like_code("generate lnprice = ln(price)"));
    assert!(enhancer.looks_like_code("tabulate foreign"));
    assert!(enhancer.looks_like_code("foreach v of varlist a b c {"));
    assert!(enhancer.looks_like_code("forvalues i = 1/10 {"));
}

#[test]
fn test_code_detection_structural_rules() {
    let enhancer = PromptEnhancer::new();
    // if ... then
    assert!(enhancer.looks_like_code("if x > 0 then do something"));
    // display shorthand
    assert!(enhancer.looks_like_code("di 2 + 2"));
    // assignment
    assert!(enhancer.looks_like_code("total = price * quantity"));
    // star comment
    assert!(enhancer.looks_like_code("* compute the averages"));
}

#[test]
fn test_code_detection_rejects_prose() {
    let enhancer = PromptEnhancer::new();
    assert!(!enhancer.looks_like_code("Hello there"));
    assert!(!enhancer.looks_like_code("What is panel data?"));
    assert!(!enhancer.looks_like_code(""));
}

#[test]
fn test_whole_word_matching() {
    let enhancer = PromptEnhancer::new();
    // "regression" must not trigger the "regress" keyword rule
    assert!(!enhancer.looks_like_code("I read a book about regression analysis"));
}

#[test]
fn test_templates_embed_the_code() {
    let code = "merge 1:1 id using other";
    for (template, verb) in [
        (TaskTemplate::Explain, "explain"),
        (TaskTemplate::Fix, "debug and fix"),
        (TaskTemplate::Optimize, "optimizations"),
    ] {
        let rendered = template.render(code);
        assert!(rendered.contains(verb), "{:?} missing verb", template);
        assert!(rendered.ends_with(code));
    }
}

#[test]
fn test_templates_flow_through_enhancer() {
    let enhancer = PromptEnhancer::new();
    let rendered = TaskTemplate::Explain.render("summarize price");
    let enhanced = enhancer.enhance(&rendered);
    assert!(enhanced.starts_with(STATA_CONTEXT));
    assert!(enhanced.ends_with("summarize price"));
}
