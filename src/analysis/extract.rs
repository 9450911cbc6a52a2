//! Code block extraction from mixed prose/code text

use std::sync::LazyLock;

use regex::Regex;

/// Fenced blocks: triple backticks with an optional stata/do language tag,
/// captured non-greedily across lines
static FENCED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:stata|do)?\n(.*?)```").expect("fenced block regex"));

/// Inline spans: single backticks with no backtick inside, on one line.
/// Restricting spans to a single line keeps the backticks of fence markers
/// from pairing with each other across lines.
static INLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("inline span regex"));

/// Extract code blocks from text.
///
/// Two passes over the same input: all fenced blocks in document order, then
/// all inline spans in document order. Inline markers inside a fenced block
/// are picked up again by the second pass. Each capture is trimmed and
/// whitespace-only captures are dropped.
pub fn extract_code_blocks(text: &str) -> Vec<String> {
    let fenced = FENCED_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()));

    let inline = INLINE_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()));

    fenced
        .chain(inline)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_before_inline() {
        let text = "Look:\n```stata\nregress y x\n```\nand inline `summarize var` too";
        assert_eq!(extract_code_blocks(text), vec!["regress y x", "summarize var"]);
    }

    #[test]
    fn test_untagged_fence() {
        let text = "```\ndisplay 1\n```";
        assert_eq!(extract_code_blocks(text), vec!["display 1"]);
    }

    #[test]
    fn test_empty_block_dropped() {
        let text = "```stata\n   \n``` and ` ` done";
        assert!(extract_code_blocks(text).is_empty());
    }
}
