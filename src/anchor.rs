//! Anchoring recovered phrases back onto the prompt they came from.

use crate::config::OverlapPolicy;
use crate::types::{Alternative, CandidateSegment, RefactorSegment};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of identifiers for segments and alternatives.
///
/// Ids only need to be unique within one result. Inject [`SequentialIds`]
/// in tests for deterministic output.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Counter-based identifiers: `{prefix}1`, `{prefix}2`, ...
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("id-")
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

/// Anchor each candidate at the first exact occurrence of its phrase.
///
/// Candidates whose phrase does not occur in `prompt` (or is empty) are
/// dropped. Output keeps candidate order; it is not sorted by offset.
pub fn anchor(
    candidates: &[CandidateSegment],
    prompt: &str,
    ids: &dyn IdSource,
) -> Vec<RefactorSegment> {
    candidates
        .iter()
        .filter_map(|candidate| {
            if candidate.original.is_empty() {
                return None;
            }
            let Some(start) = prompt.find(candidate.original.as_str()) else {
                log::warn!(
                    "Dropping suggested phrase not found in prompt: {:?}",
                    candidate.original
                );
                return None;
            };

            Some(RefactorSegment {
                id: ids.next_id(),
                original: candidate.original.clone(),
                start_index: start,
                end_index: start + candidate.original.len(),
                reason: String::new(),
                alternatives: candidate
                    .alternatives
                    .iter()
                    .map(|text| Alternative {
                        id: ids.next_id(),
                        text: text.clone(),
                    })
                    .collect(),
            })
        })
        .collect()
}

/// Apply an [`OverlapPolicy`] to anchored segments.
///
/// With `DropLater`, a segment is kept only if it is disjoint from every
/// segment kept before it. Survivors stay in their original order.
pub fn resolve_overlaps(
    segments: Vec<RefactorSegment>,
    policy: OverlapPolicy,
) -> Vec<RefactorSegment> {
    match policy {
        OverlapPolicy::Keep => segments,
        OverlapPolicy::DropLater => {
            let mut kept: Vec<RefactorSegment> = Vec::with_capacity(segments.len());
            for segment in segments {
                if let Some(earlier) = kept.iter().find(|k| k.overlaps(&segment)) {
                    log::warn!(
                        "Dropping segment {:?} ({}..{}): overlaps {:?}",
                        segment.original,
                        segment.start_index,
                        segment.end_index,
                        earlier.original
                    );
                    continue;
                }
                kept.push(segment);
            }
            kept
        }
    }
}
