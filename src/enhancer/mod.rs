//! Prompt enhancement module
//!
//! Wraps raw user text with the fixed Stata domain context before it is
//! sent to the model runtime.

pub mod prompt_enhancer;
pub mod templates;

pub use prompt_enhancer::{CodePattern, PromptEnhancer, CODE_PATTERNS};
pub use templates::{TaskTemplate, COMMAND_CATALOG, STATA_CONTEXT};
