use crate::{
    anchor::{anchor, resolve_overlaps, IdSource, UuidIds},
    config::RefactorConfig,
    error::{RefactorError, Result},
    locate::locate_object,
    schema::normalize_with_limits,
    strip::strip_artifacts,
    types::RefactorResult,
};
use serde_json::Value;
use std::sync::Arc;

/// Extract segments with the default configuration and random ids.
///
/// Runs strip -> locate -> decode -> normalize -> anchor. Fails outright
/// (never a partial result) when no object is found, it never balances, it
/// is not valid JSON, it matches no known shape, or no phrase anchors.
pub fn extract_segments(raw: &str, prompt: &str) -> Result<RefactorResult> {
    Extractor::default().extract(raw, prompt)
}

/// The extraction pipeline with its limits and id source fixed.
#[derive(Clone)]
pub struct Extractor {
    config: RefactorConfig,
    ids: Arc<dyn IdSource>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(RefactorConfig::default())
    }
}

impl Extractor {
    pub fn new(config: RefactorConfig) -> Self {
        Self {
            config,
            ids: Arc::new(UuidIds),
        }
    }

    /// Use a different id source, e.g. [`SequentialIds`](crate::SequentialIds) in tests.
    pub fn with_ids(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &RefactorConfig {
        &self.config
    }

    pub fn extract(&self, raw: &str, prompt: &str) -> Result<RefactorResult> {
        let text = strip_artifacts(raw);
        log::debug!(
            "Stripped model output from {} to {} bytes",
            raw.len(),
            text.len()
        );

        let bounds = locate_object(&text)?;
        log::debug!("Located JSON object at {}..={}", bounds.start, bounds.end);
        let value: Value =
            serde_json::from_str(bounds.slice(&text)).map_err(RefactorError::MalformedJson)?;

        let candidates = normalize_with_limits(
            &value,
            self.config.max_segments,
            self.config.max_alternatives,
        )?;

        let anchored = anchor(&candidates, prompt, self.ids.as_ref());
        let segments = resolve_overlaps(anchored, self.config.overlap_policy);
        if segments.is_empty() {
            return Err(RefactorError::NoAnchorableSegments {
                candidates: candidates.len(),
            });
        }

        log::debug!(
            "Anchored {} of {} candidate segments",
            segments.len(),
            candidates.len()
        );
        Ok(RefactorResult {
            original_prompt: prompt.to_string(),
            segments,
        })
    }
}
