use crate::error::{RefactorError, Result};
use crate::schema::{MAX_ALTERNATIVES, MAX_SEGMENTS};

/// What to do when two anchored segments cover overlapping ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Expose segments exactly as anchored, overlaps included.
    Keep,
    /// Drop any segment that overlaps one anchored before it.
    #[default]
    DropLater,
}

/// Configuration for the extraction pipeline.
///
/// Use [`RefactorConfig::builder()`] to override the defaults
/// (3 segments, 3 alternatives each, overlapping segments dropped).
#[derive(Debug, Clone)]
pub struct RefactorConfig {
    /// Maximum number of segments kept from one model response.
    pub max_segments: usize,

    /// Maximum number of alternatives kept per segment.
    pub max_alternatives: usize,

    /// Overlap handling applied after anchoring.
    pub overlap_policy: OverlapPolicy,
}

impl Default for RefactorConfig {
    fn default() -> Self {
        Self {
            max_segments: MAX_SEGMENTS,
            max_alternatives: MAX_ALTERNATIVES,
            overlap_policy: OverlapPolicy::default(),
        }
    }
}

impl RefactorConfig {
    /// Start building a config with the builder pattern.
    pub fn builder() -> RefactorConfigBuilder {
        RefactorConfigBuilder::default()
    }
}

/// Builder for [`RefactorConfig`].
#[derive(Default)]
pub struct RefactorConfigBuilder {
    config: RefactorConfig,
}

impl RefactorConfigBuilder {
    pub fn with_max_segments(mut self, max: usize) -> Self {
        self.config.max_segments = max;
        self
    }

    pub fn with_max_alternatives(mut self, max: usize) -> Self {
        self.config.max_alternatives = max;
        self
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.config.overlap_policy = policy;
        self
    }

    /// Build the final [`RefactorConfig`], rejecting zero limits.
    pub fn build(self) -> Result<RefactorConfig> {
        if self.config.max_segments == 0 {
            return Err(RefactorError::InvalidConfig(
                "max_segments must be at least 1".to_string(),
            ));
        }
        if self.config.max_alternatives == 0 {
            return Err(RefactorError::InvalidConfig(
                "max_alternatives must be at least 1".to_string(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RefactorConfig::default();
        assert_eq!(config.max_segments, 3);
        assert_eq!(config.max_alternatives, 3);
        assert_eq!(config.overlap_policy, OverlapPolicy::DropLater);
    }

    #[test]
    fn test_builder() {
        let config = RefactorConfig::builder()
            .with_max_segments(5)
            .with_max_alternatives(2)
            .with_overlap_policy(OverlapPolicy::Keep)
            .build()
            .unwrap();
        assert_eq!(config.max_segments, 5);
        assert_eq!(config.max_alternatives, 2);
        assert_eq!(config.overlap_policy, OverlapPolicy::Keep);
    }

    #[test]
    fn test_zero_limits_rejected() {
        let result = RefactorConfig::builder().with_max_segments(0).build();
        match result.unwrap_err() {
            RefactorError::InvalidConfig(msg) => assert!(msg.contains("max_segments")),
            _ => panic!("Expected InvalidConfig error"),
        }

        let result = RefactorConfig::builder().with_max_alternatives(0).build();
        assert!(result.is_err());
    }
}
