//! # prompt-refactor
//!
//! Recover phrase-level rewrite suggestions from noisy LLM output and apply
//! them to image-generation prompts.
//!
//! ## Features
//!
//! - **Artifact stripping** — removes `<think>`/`<reasoning>` blocks
//!   (including unterminated ones) and markdown code fences
//! - **String-aware object location** — finds the first balanced JSON
//!   object in surrounding prose without being fooled by braces or escaped
//!   quotes inside string literals
//! - **Two response shapes** — `{"segments": [...]}` and flat
//!   `{"phrase": ["alt", ...]}` maps, bounded to 3 segments x 3 alternatives
//!   by default
//! - **Exact anchoring** — every segment carries byte offsets into the
//!   original prompt; phrases the model invented are dropped
//! - **Drift-free reconstruction** — selected alternatives are substituted
//!   right to left so offsets never shift
//! - **Session state machine** — idle/loading/active/applying with stale
//!   completion guarding
//!
//! ## Quick Start
//!
//! ```
//! use prompt_refactor::{build_modified_prompt, extract_segments, SelectedAlternatives};
//!
//! let raw = "<think>pick phrases</think>\n```json\n\
//!            {\"segments\":[{\"original\":\"a cat\",\"alternatives\":[\"a dog\",\"a fox\"]}]}\n```";
//! let prompt = "I saw a cat running";
//!
//! let result = extract_segments(raw, prompt).unwrap();
//! let segment = &result.segments[0];
//! assert_eq!((segment.start_index, segment.end_index), (6, 11));
//!
//! let mut selections = SelectedAlternatives::new();
//! selections.insert(segment.id.clone(), segment.alternatives[1].id.clone());
//! assert_eq!(
//!     build_modified_prompt(prompt, &result.segments, &selections),
//!     "I saw a fox running"
//! );
//! ```
//!
//! ## Failure Modes
//!
//! Extraction either returns at least one anchored segment or fails:
//!
//! ```
//! use prompt_refactor::{extract_segments, RefactorError};
//!
//! assert!(matches!(
//!     extract_segments("no json here", "a prompt"),
//!     Err(RefactorError::NoJsonFound)
//! ));
//! assert!(matches!(
//!     extract_segments(r#"{"unclosed": true"#, "a prompt"),
//!     Err(RefactorError::UnbalancedJson)
//! ));
//! ```

pub mod anchor;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod locate;
pub mod prompt;
pub mod reconstruct;
pub mod schema;
pub mod session;
pub mod strip;
pub mod types;

pub use anchor::{anchor, resolve_overlaps, IdSource, SequentialIds, UuidIds};
pub use client::{ChatClient, LlmConfig, TextGenerator};
pub use config::{OverlapPolicy, RefactorConfig, RefactorConfigBuilder};
pub use error::{RefactorError, Result};
pub use extract::{extract_segments, Extractor};
pub use locate::{find_json_bounds, locate_object, JsonBounds, ScanState, ScanStep};
pub use reconstruct::{build_modified_prompt, display_text, fragments, Fragment};
pub use schema::{normalize, normalize_with_limits, ResponseSchema};
pub use session::{RefactorPhase, RefactorSession, VersionStore};
pub use strip::strip_artifacts;
pub use types::{
    Alternative, CandidateSegment, RefactorResult, RefactorSegment, SelectedAlternatives,
    VersionRecord,
};
