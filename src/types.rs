use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A schema-independent `(phrase, alternatives)` pair recovered from model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSegment {
    pub original: String,
    pub alternatives: Vec<String>,
}

impl CandidateSegment {
    pub fn new(original: impl Into<String>, alternatives: Vec<String>) -> Self {
        Self {
            original: original.into(),
            alternatives,
        }
    }
}

/// One suggested replacement for a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub id: String,
    pub text: String,
}

/// A phrase of the original prompt anchored to exact byte offsets.
///
/// `original` always equals `&prompt[start_index..end_index]` for the prompt
/// the segment was anchored against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorSegment {
    pub id: String,
    pub original: String,
    pub start_index: usize,
    pub end_index: usize,
    #[serde(default)]
    pub reason: String,
    pub alternatives: Vec<Alternative>,
}

impl RefactorSegment {
    /// Look up one of this segment's alternatives by id.
    pub fn alternative(&self, id: &str) -> Option<&Alternative> {
        self.alternatives.iter().find(|alt| alt.id == id)
    }

    /// True if the two segments cover at least one common byte.
    pub fn overlaps(&self, other: &RefactorSegment) -> bool {
        self.start_index < other.end_index && other.start_index < self.end_index
    }
}

/// The outcome of one successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorResult {
    pub original_prompt: String,
    pub segments: Vec<RefactorSegment>,
}

impl RefactorResult {
    /// Find a segment by id.
    pub fn segment(&self, id: &str) -> Option<&RefactorSegment> {
        self.segments.iter().find(|seg| seg.id == id)
    }
}

/// Segment id -> chosen alternative id.
pub type SelectedAlternatives = HashMap<String, String>;

/// A prompt version as returned by the persistence layer after an apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub id: String,
    pub content: String,
    pub version_name: String,
}
