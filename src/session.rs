//! One "refactor → pick alternatives → apply" interaction.
//!
//! Phase lifecycle:
//!
//! ```text
//! Idle --start--> Loading --ok--> Active --apply--> Applying --ok--> Idle
//!                    |              ^  |                |
//!                    +--err--> Idle |  +--start--> ...  +--err--> Active
//! ```
//!
//! Every transition that starts an async call records the session
//! generation; [`RefactorSession::reset`] and new extractions bump it, and a
//! completion whose generation no longer matches is discarded instead of
//! overwriting newer state.

use crate::{
    client::TextGenerator,
    error::{RefactorError, Result},
    extract::Extractor,
    prompt::system_prompt,
    reconstruct::build_modified_prompt,
    types::{RefactorResult, SelectedAlternatives, VersionRecord},
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RefactorPhase {
    Idle,
    Loading,
    Active,
    Applying,
}

impl RefactorPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefactorPhase::Idle => "idle",
            RefactorPhase::Loading => "loading",
            RefactorPhase::Active => "active",
            RefactorPhase::Applying => "applying",
        }
    }
}

/// Persists the final prompt text as a new version.
///
/// # Example
///
/// ```ignore
/// struct ApiStore { client: reqwest::Client }
///
/// impl VersionStore for ApiStore {
///     async fn create_version(
///         &self,
///         prompt_id: &str,
///         content: &str,
///         image_url: Option<&str>,
///     ) -> anyhow::Result<VersionRecord> {
///         // POST /api/prompts/{prompt_id}/versions ...
///     }
/// }
/// ```
pub trait VersionStore: Send + Sync {
    fn create_version(
        &self,
        prompt_id: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> impl std::future::Future<Output = anyhow::Result<VersionRecord>> + Send;
}

#[derive(Debug)]
struct SessionState {
    phase: RefactorPhase,
    result: Option<RefactorResult>,
    selections: SelectedAlternatives,
    error: Option<String>,
    generation: u64,
}

impl SessionState {
    fn idle(generation: u64) -> Self {
        Self {
            phase: RefactorPhase::Idle,
            result: None,
            selections: SelectedAlternatives::new(),
            error: None,
            generation,
        }
    }
}

/// A refactor session over one prompt.
pub struct RefactorSession<G, S>
where
    G: TextGenerator,
    S: VersionStore,
{
    prompt_id: String,
    prompt: String,
    generator: G,
    store: S,
    extractor: Extractor,
    state: Mutex<SessionState>,
}

impl<G, S> std::fmt::Debug for RefactorSession<G, S>
where
    G: TextGenerator,
    S: VersionStore,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefactorSession")
            .field("prompt_id", &self.prompt_id)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl<G, S> RefactorSession<G, S>
where
    G: TextGenerator,
    S: VersionStore,
{
    pub fn new(
        prompt_id: impl Into<String>,
        prompt: impl Into<String>,
        generator: G,
        store: S,
    ) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            prompt: prompt.into(),
            generator,
            store,
            extractor: Extractor::default(),
            state: Mutex::new(SessionState::idle(0)),
        }
    }

    /// Replace the extractor (limits, overlap policy, id source).
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn prompt_id(&self) -> &str {
        &self.prompt_id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> RefactorPhase {
        self.lock().phase
    }

    pub fn result(&self) -> Option<RefactorResult> {
        self.lock().result.clone()
    }

    pub fn selections(&self) -> SelectedAlternatives {
        self.lock().selections.clone()
    }

    /// Message of the last failed extraction or apply, if any.
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Ask the generator for suggestions and extract segments from its reply.
    ///
    /// Allowed from Idle or Active. On failure the session returns to Idle
    /// with the error recorded; a previously held result is left in place.
    pub async fn start(&self) -> Result<RefactorResult> {
        let generation = {
            let mut state = self.lock();
            if matches!(state.phase, RefactorPhase::Loading | RefactorPhase::Applying) {
                return Err(RefactorError::InvalidState {
                    phase: state.phase.as_str(),
                    action: "start a refactor",
                });
            }
            state.generation += 1;
            state.phase = RefactorPhase::Loading;
            state.error = None;
            state.generation
        };
        log::info!("Refactor started for prompt {}", self.prompt_id);

        let system = system_prompt(self.extractor.config());
        let outcome = match self.generator.generate(&system, &self.prompt).await {
            Ok(raw) => self.extractor.extract(&raw, &self.prompt),
            Err(e) => Err(e),
        };

        let mut state = self.lock();
        if state.generation != generation {
            log::warn!(
                "Discarding stale refactor result for prompt {}",
                self.prompt_id
            );
            return Err(RefactorError::Stale);
        }

        match outcome {
            Ok(result) => {
                log::info!(
                    "Refactor found {} segments for prompt {}",
                    result.segments.len(),
                    self.prompt_id
                );
                state.phase = RefactorPhase::Active;
                state.result = Some(result.clone());
                state.selections.clear();
                state.error = None;
                Ok(result)
            }
            Err(e) => {
                log::warn!("Refactor failed for prompt {}: {}", self.prompt_id, e);
                state.phase = RefactorPhase::Idle;
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Choose an alternative for a segment. Active phase only.
    pub fn select_alternative(
        &self,
        segment_id: impl Into<String>,
        alternative_id: impl Into<String>,
    ) -> Result<()> {
        let mut state = self.lock();
        if state.phase != RefactorPhase::Active {
            return Err(RefactorError::InvalidState {
                phase: state.phase.as_str(),
                action: "select an alternative",
            });
        }
        state
            .selections
            .insert(segment_id.into(), alternative_id.into());
        Ok(())
    }

    /// The prompt with the current selections applied.
    pub fn modified_prompt(&self) -> String {
        let state = self.lock();
        match state.result {
            Some(ref result) => {
                build_modified_prompt(&self.prompt, &result.segments, &state.selections)
                    .into_owned()
            }
            None => self.prompt.clone(),
        }
    }

    /// Persist the modified prompt as a new version.
    ///
    /// Returns `Ok(None)` without touching the store when the selections
    /// leave the prompt unchanged. On a store failure the session goes back
    /// to Active with its result and selections intact.
    pub async fn apply(&self, image_url: Option<&str>) -> Result<Option<VersionRecord>> {
        let (generation, content) = {
            let mut state = self.lock();
            if state.phase != RefactorPhase::Active {
                return Err(RefactorError::InvalidState {
                    phase: state.phase.as_str(),
                    action: "apply changes",
                });
            }
            let Some(ref result) = state.result else {
                return Ok(None);
            };
            let content =
                match build_modified_prompt(&self.prompt, &result.segments, &state.selections) {
                    Cow::Borrowed(_) => return Ok(None),
                    Cow::Owned(text) => text,
                };
            state.phase = RefactorPhase::Applying;
            (state.generation, content)
        };

        let saved = self
            .store
            .create_version(&self.prompt_id, &content, image_url)
            .await;

        let mut state = self.lock();
        let current = state.generation == generation;
        if !current {
            log::warn!(
                "Session for prompt {} changed while saving; leaving state untouched",
                self.prompt_id
            );
        }

        match saved {
            Ok(record) => {
                log::info!(
                    "Saved version {} ({}) for prompt {}",
                    record.version_name,
                    record.id,
                    self.prompt_id
                );
                if current {
                    let generation = state.generation;
                    *state = SessionState::idle(generation);
                }
                Ok(Some(record))
            }
            Err(e) => {
                let message = e.to_string();
                log::warn!(
                    "Saving version for prompt {} failed: {}",
                    self.prompt_id,
                    message
                );
                if current {
                    state.phase = RefactorPhase::Active;
                    state.error = Some(message.clone());
                }
                Err(RefactorError::Persistence(message))
            }
        }
    }

    /// Drop any result and selections, and orphan in-flight calls.
    pub fn reset(&self) {
        let mut state = self.lock();
        let generation = state.generation + 1;
        *state = SessionState::idle(generation);
    }
}
