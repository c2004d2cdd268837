//! Normalization of the two response shapes models produce.
//!
//! 1. Segments array: `{"segments": [{"original": "...", "alternatives": ["..."]}]}`
//! 2. Flat map: `{"phrase": ["alt1", "alt2"], "other phrase": ["alt"]}`
//!
//! Shapes are tried in [`ResponseSchema::PRIORITY`] order and the first whose
//! structural precondition holds is the only one used.

use crate::error::{RefactorError, Result};
use crate::types::CandidateSegment;
use serde_json::{Map, Value};

/// Default cap on segments taken from one response.
pub const MAX_SEGMENTS: usize = 3;

/// Default cap on alternatives kept per segment.
pub const MAX_ALTERNATIVES: usize = 3;

/// The response shapes the normalizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSchema {
    /// Top-level object with a `segments` array.
    SegmentsArray,
    /// Top-level object mapping each phrase to an array of alternatives.
    FlatMap,
}

impl ResponseSchema {
    pub const PRIORITY: [ResponseSchema; 2] =
        [ResponseSchema::SegmentsArray, ResponseSchema::FlatMap];

    pub fn name(&self) -> &'static str {
        match self {
            ResponseSchema::SegmentsArray => "segments array",
            ResponseSchema::FlatMap => "flat map",
        }
    }

    /// Structural precondition for this shape.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ResponseSchema::SegmentsArray => value.get("segments").is_some_and(Value::is_array),
            ResponseSchema::FlatMap => value.is_object(),
        }
    }

    /// Map a matching value to bounded candidates.
    ///
    /// Returns an empty list when the value does not match.
    pub fn candidates(
        &self,
        value: &Value,
        max_segments: usize,
        max_alternatives: usize,
    ) -> Vec<CandidateSegment> {
        match self {
            ResponseSchema::SegmentsArray => value
                .get("segments")
                .and_then(Value::as_array)
                .map(|items| segments_array(items, max_segments, max_alternatives))
                .unwrap_or_default(),
            ResponseSchema::FlatMap => value
                .as_object()
                .map(|map| flat_map(map, max_segments, max_alternatives))
                .unwrap_or_default(),
        }
    }
}

/// First shape in priority order whose precondition holds.
pub fn detect(value: &Value) -> Option<ResponseSchema> {
    ResponseSchema::PRIORITY
        .into_iter()
        .find(|schema| schema.matches(value))
}

/// Normalize with the default caps of 3 segments and 3 alternatives.
pub fn normalize(value: &Value) -> Result<Vec<CandidateSegment>> {
    normalize_with_limits(value, MAX_SEGMENTS, MAX_ALTERNATIVES)
}

/// Normalize a decoded response into canonical candidates.
///
/// Fails when no shape matches, or when the matching shape yields nothing.
/// A `segments` array that yields nothing does not fall back to the flat map.
pub fn normalize_with_limits(
    value: &Value,
    max_segments: usize,
    max_alternatives: usize,
) -> Result<Vec<CandidateSegment>> {
    let schema = detect(value).ok_or_else(|| {
        RefactorError::NoRecognizedSchema("response is not a JSON object".to_string())
    })?;

    let candidates = schema.candidates(value, max_segments, max_alternatives);
    if candidates.is_empty() {
        return Err(RefactorError::NoRecognizedSchema(format!(
            "{} response contained no usable segments",
            schema.name()
        )));
    }

    log::debug!(
        "Normalized {} candidates from {} response",
        candidates.len(),
        schema.name()
    );
    Ok(candidates)
}

fn segments_array(
    items: &[Value],
    max_segments: usize,
    max_alternatives: usize,
) -> Vec<CandidateSegment> {
    items
        .iter()
        .take(max_segments)
        .filter_map(|item| {
            let original = item.get("original")?.as_str()?;
            let alternatives = item
                .get("alternatives")
                .and_then(Value::as_array)
                .map(|alts| string_items(alts, max_alternatives))
                .unwrap_or_default();
            Some(CandidateSegment::new(original, alternatives))
        })
        .collect()
}

fn flat_map(
    map: &Map<String, Value>,
    max_segments: usize,
    max_alternatives: usize,
) -> Vec<CandidateSegment> {
    map.iter()
        .filter_map(|(key, value)| {
            let alts = value.as_array()?;
            // first element doubles as the "array of strings" guard
            alts.first()?.as_str()?;
            Some(CandidateSegment::new(
                key.as_str(),
                string_items(alts, max_alternatives),
            ))
        })
        .take(max_segments)
        .collect()
}

fn string_items(values: &[Value], max: usize) -> Vec<String> {
    values
        .iter()
        .take(max)
        .filter_map(|v| v.as_str().map(|s| s.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn segments_array_basic() {
        let value = json!({
            "segments": [
                {"original": "a cat", "alternatives": ["a dog", "a bird", "a fish"]}
            ]
        });
        let candidates = normalize(&value).unwrap();
        assert_eq!(
            candidates,
            vec![CandidateSegment::new(
                "a cat",
                vec!["a dog".into(), "a bird".into(), "a fish".into()]
            )]
        );
    }

    #[test]
    fn segments_array_bounds() {
        let segments: Vec<Value> = (0..4)
            .map(|i| {
                json!({
                    "original": format!("phrase {}", i),
                    "alternatives": (0..5).map(|j| format!("alt {}-{}", i, j)).collect::<Vec<_>>(),
                })
            })
            .collect();
        let candidates = normalize(&json!({ "segments": segments })).unwrap();

        assert_eq!(candidates.len(), 3);
        for (i, candidate) in candidates.iter().enumerate() {
            assert_eq!(candidate.original, format!("phrase {}", i));
            assert_eq!(
                candidate.alternatives,
                vec![
                    format!("alt {}-0", i),
                    format!("alt {}-1", i),
                    format!("alt {}-2", i)
                ]
            );
        }
    }

    #[test]
    fn segments_array_missing_alternatives_becomes_empty() {
        let value = json!({
            "segments": [
                {"original": "sunset"},
                {"original": "glow", "alternatives": "not an array"}
            ]
        });
        let candidates = normalize(&value).unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].alternatives.is_empty());
        assert!(candidates[1].alternatives.is_empty());
    }

    #[test]
    fn segments_array_skips_elements_without_original() {
        let value = json!({
            "segments": [
                {"alternatives": ["x"]},
                {"original": 42, "alternatives": ["y"]},
                {"original": "kept", "alternatives": ["z"]}
            ]
        });
        let candidates = normalize(&value).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].original, "kept");
    }

    #[test]
    fn empty_segments_array_does_not_fall_back() {
        let value = json!({
            "segments": [],
            "a cat": ["a dog"]
        });
        match normalize(&value).unwrap_err() {
            RefactorError::NoRecognizedSchema(msg) => assert!(msg.contains("segments array")),
            other => panic!("Expected NoRecognizedSchema, got {:?}", other),
        }
    }

    #[test]
    fn segments_field_not_array_uses_flat_map() {
        let value = json!({
            "segments": "oops",
            "golden light": ["warm glow", "amber haze"]
        });
        assert_eq!(detect(&value), Some(ResponseSchema::FlatMap));
        let candidates = normalize(&value).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].original, "golden light");
    }

    #[test]
    fn flat_map_type_guard() {
        let value = json!({
            "numbers": [1, 2, 3],
            "a cat": ["a dog", "a bird"],
            "empty": [],
            "scalar": "text",
            "dark forest": ["misty woods"]
        });
        let candidates = normalize(&value).unwrap();
        assert_eq!(
            candidates,
            vec![
                CandidateSegment::new("a cat", vec!["a dog".into(), "a bird".into()]),
                CandidateSegment::new("dark forest", vec!["misty woods".into()]),
            ]
        );
    }

    #[test]
    fn flat_map_bounds_preserve_key_order() {
        let value = json!({
            "zeta": ["1", "2", "3", "4"],
            "alpha": ["1"],
            "mu": ["1", "2"],
            "beta": ["1"]
        });
        let candidates = normalize(&value).unwrap();
        let keys: Vec<&str> = candidates.iter().map(|c| c.original.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mu"]);
        assert_eq!(candidates[0].alternatives.len(), 3);
    }

    #[test]
    fn unrecognized_object_fails() {
        let value = json!({"totally": "wrong"});
        assert!(matches!(
            normalize(&value),
            Err(RefactorError::NoRecognizedSchema(_))
        ));
    }

    #[test]
    fn non_object_fails() {
        assert!(detect(&json!(["a", "b"])).is_none());
        assert!(matches!(
            normalize(&json!(["a", "b"])),
            Err(RefactorError::NoRecognizedSchema(_))
        ));
    }

    #[test]
    fn custom_limits() {
        let value = json!({
            "segments": [
                {"original": "one", "alternatives": ["a", "b", "c"]},
                {"original": "two", "alternatives": ["d"]}
            ]
        });
        let candidates = normalize_with_limits(&value, 1, 2).unwrap();
        assert_eq!(
            candidates,
            vec![CandidateSegment::new("one", vec!["a".into(), "b".into()])]
        );
    }
}
