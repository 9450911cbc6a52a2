//! Text-level Stata code utilities
//!
//! Pure helpers independent of any model call: code block extraction,
//! reindentation, and coarse syntax validation.

pub mod extract;
pub mod format;
pub mod validate;

pub use extract::extract_code_blocks;
pub use format::format_code;
pub use validate::{validate_syntax, SyntaxCheck};
