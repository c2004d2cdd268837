//! Locate the first balanced top-level JSON object inside noisy text.
//!
//! The text around the object is arbitrary prose, so a JSON parser can't be
//! pointed at it until the object's bounds are known. The scan starts at the
//! first `{` and runs a small state machine over the bytes:
//!
//! | State / byte            | Transition                          |
//! |-------------------------|-------------------------------------|
//! | `escape_next` set       | clear it, consume the byte          |
//! | `\`                     | set `escape_next`                   |
//! | `"`                     | toggle `in_string`                  |
//! | any byte in a string    | ignored                             |
//! | `{`                     | `depth += 1`                        |
//! | `}`                     | `depth -= 1`, closed when it hits 0 |
//!
//! All structural characters are ASCII and UTF-8 continuation bytes never
//! collide with them, so scanning bytes is equivalent to scanning chars.

use crate::error::{RefactorError, Result};

/// Mutable state threaded through the brace scanner.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanState {
    /// Nesting level of braces seen outside string literals.
    pub depth: i64,
    /// Inside a string literal.
    pub in_string: bool,
    /// The previous byte was an unescaped backslash.
    pub escape_next: bool,
}

/// Outcome of feeding one byte to [`ScanState::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStep {
    Continue,
    /// The outermost object just closed on this byte.
    Closed,
}

impl ScanState {
    pub fn advance(&mut self, byte: u8) -> ScanStep {
        if self.escape_next {
            self.escape_next = false;
            return ScanStep::Continue;
        }
        match byte {
            b'\\' => self.escape_next = true,
            b'"' => self.in_string = !self.in_string,
            _ if self.in_string => {}
            b'{' => self.depth += 1,
            b'}' => {
                self.depth -= 1;
                if self.depth == 0 {
                    return ScanStep::Closed;
                }
            }
            _ => {}
        }
        ScanStep::Continue
    }
}

/// Inclusive byte bounds of a located object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonBounds {
    pub start: usize,
    pub end: usize,
}

impl JsonBounds {
    /// The object text, `text[start..=end]`.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..=self.end]
    }
}

/// Find the outermost object starting at the first `{`.
///
/// Returns `None` when there is no `{` at all or when the object never
/// balances before the input ends.
pub fn find_json_bounds(text: &str) -> Option<JsonBounds> {
    locate_object(text).ok()
}

/// Like [`find_json_bounds`], but says why nothing was found.
pub fn locate_object(text: &str) -> Result<JsonBounds> {
    let start = text.find('{').ok_or(RefactorError::NoJsonFound)?;

    let mut state = ScanState::default();
    for (offset, &byte) in text.as_bytes()[start..].iter().enumerate() {
        if state.advance(byte) == ScanStep::Closed {
            return Ok(JsonBounds {
                start,
                end: start + offset,
            });
        }
    }

    Err(RefactorError::UnbalancedJson)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_whole_string() {
        let text = r#"{"key":"value"}"#;
        let bounds = find_json_bounds(text).unwrap();
        assert_eq!(bounds.start, 0);
        assert_eq!(bounds.end, text.len() - 1);
    }

    #[test]
    fn bounds_after_prose() {
        let text = r#"Here is the JSON: {"key":"value"}"#;
        let bounds = find_json_bounds(text).unwrap();
        assert_eq!(bounds.start, 18);
        assert_eq!(bounds.slice(text), r#"{"key":"value"}"#);
    }

    #[test]
    fn braces_inside_strings_ignored() {
        let text = r#"{"key":"value with { and }"}"#;
        let bounds = find_json_bounds(text).unwrap();
        assert_eq!(bounds.end, text.len() - 1);
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let text = r#"{"key":"say \"}\" now"} trailing"#;
        let bounds = find_json_bounds(text).unwrap();
        assert_eq!(bounds.slice(text), r#"{"key":"say \"}\" now"}"#);
    }

    #[test]
    fn escaped_backslash_before_closing_quote() {
        let text = r#"{"a":"x\\"} tail"#;
        let bounds = find_json_bounds(text).unwrap();
        assert_eq!(bounds.end, 10);
        assert_eq!(bounds.slice(text), r#"{"a":"x\\"}"#);

        let text = r#"{"path":"C:\\dir\\","b":"}"} after"#;
        assert_eq!(
            find_json_bounds(text).unwrap().slice(text),
            r#"{"path":"C:\\dir\\","b":"}"}"#
        );
    }

    #[test]
    fn nested_objects() {
        let text = r#"prefix {"a":{"b":{"c":1}},"d":2} suffix {"e":3}"#;
        let bounds = find_json_bounds(text).unwrap();
        assert_eq!(bounds.slice(text), r#"{"a":{"b":{"c":1}},"d":2}"#);
    }

    #[test]
    fn multibyte_text_around_object() {
        let text = "Voilà → {\"café\":\"crème {brûlée}\"} fin";
        let bounds = find_json_bounds(text).unwrap();
        assert_eq!(bounds.slice(text), "{\"café\":\"crème {brûlée}\"}");
    }

    #[test]
    fn no_brace_not_found() {
        assert_eq!(find_json_bounds("no json here"), None);
        assert!(matches!(
            locate_object("no json here"),
            Err(RefactorError::NoJsonFound)
        ));
    }

    #[test]
    fn unterminated_not_found() {
        assert_eq!(find_json_bounds(r#"{"unclosed": true"#), None);
        assert!(matches!(
            locate_object(r#"{"unclosed": true"#),
            Err(RefactorError::UnbalancedJson)
        ));
    }

    #[test]
    fn unterminated_string_never_closes() {
        assert!(matches!(
            locate_object(r#"{"open: }"#),
            Err(RefactorError::UnbalancedJson)
        ));
    }

    #[test]
    fn scan_state_transitions() {
        let mut state = ScanState::default();
        assert_eq!(state.advance(b'{'), ScanStep::Continue);
        assert_eq!(state.depth, 1);
        state.advance(b'"');
        assert!(state.in_string);
        state.advance(b'{');
        assert_eq!(state.depth, 1);
        state.advance(b'\\');
        assert!(state.escape_next);
        state.advance(b'"');
        assert!(!state.escape_next);
        assert!(state.in_string);
        state.advance(b'"');
        assert!(!state.in_string);
        assert_eq!(state.advance(b'}'), ScanStep::Closed);
        assert_eq!(state.depth, 0);
    }
}
