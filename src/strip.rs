//! Removal of non-JSON wrapper artifacts from raw model output.
//!
//! Reasoning models wrap their chain of thought in `<think>` or
//! `<reasoning>` blocks, and chat models like to fence JSON in markdown.
//! Both are removed before the object locator runs:
//!
//! - `<think>reasoning</think>{...}` -> `{...}`
//! - `<think>reasoning without closing {...}` -> `` (strips to end)
//! - `` ```json\n{...}\n``` `` -> `{...}` (any language label, or none)

use once_cell::sync::Lazy;
use regex::Regex;

static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<think>.*?(?:</think>|$)").expect("think block regex"));

static REASONING_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<reasoning>.*?(?:</reasoning>|$)").expect("reasoning block regex")
});

/// Opening fence followed by a language label (`json`, `jsonc`, `javascript`, ...).
static LABELED_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z0-9_+.-]+\s*").expect("labeled fence regex"));

static BARE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```\s*").expect("fence regex"));

/// Strip reasoning blocks and code-fence markers, then trim.
///
/// Never fails. An opening reasoning tag without its closing tag swallows
/// everything after it, so JSON that only appears inside an unterminated
/// block is gone after stripping.
pub fn strip_artifacts(raw: &str) -> String {
    let text = THINK_BLOCK.replace_all(raw, "");
    let text = REASONING_BLOCK.replace_all(&text, "");
    let text = LABELED_FENCE.replace_all(&text, "");
    let text = BARE_FENCE.replace_all(&text, "");
    text.trim().to_string()
}
