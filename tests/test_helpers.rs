#![allow(dead_code)]

use prompt_refactor::*;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Generator that returns a canned reply, optionally waiting for a signal first.
pub struct FakeGenerator {
    pub reply: std::result::Result<String, String>,
    pub gate: Option<Arc<Notify>>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

impl TextGenerator for FakeGenerator {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        if let Some(ref gate) = self.gate {
            gate.notified().await;
        }
        self.reply
            .clone()
            .map_err(|message| RefactorError::Provider {
                status: 503,
                message,
            })
    }
}

/// Store that records saved versions, or fails with a fixed message.
#[derive(Default)]
pub struct FakeStore {
    pub fail_with: Option<String>,
    pub gate: Option<Arc<Notify>>,
    pub saved: Mutex<Vec<(String, String, Option<String>)>>,
}

impl FakeStore {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn saved_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

impl VersionStore for FakeStore {
    async fn create_version(
        &self,
        prompt_id: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> anyhow::Result<VersionRecord> {
        if let Some(ref gate) = self.gate {
            gate.notified().await;
        }
        if let Some(ref message) = self.fail_with {
            anyhow::bail!("{}", message);
        }
        let mut saved = self.saved.lock().unwrap();
        saved.push((
            prompt_id.to_string(),
            content.to_string(),
            image_url.map(|s| s.to_string()),
        ));
        Ok(VersionRecord {
            id: format!("version-{}", saved.len()),
            content: content.to_string(),
            version_name: format!("v{}", saved.len() + 1),
        })
    }
}

pub const PROMPT: &str = "A cinematic sunset over a quiet harbor";

pub const REPLY: &str = "<think>Looking for vivid phrases</think>\n```json\n{\"segments\":[\
{\"original\":\"cinematic\",\"alternatives\":[\"dramatic\",\"moody\",\"epic\"]},\
{\"original\":\"a quiet harbor\",\"alternatives\":[\"a bustling port\",\"a frozen bay\"]}\
]}\n```";

pub fn session(
    generator: FakeGenerator,
    store: FakeStore,
) -> RefactorSession<FakeGenerator, FakeStore> {
    RefactorSession::new("prompt-1", PROMPT, generator, store)
        .with_extractor(Extractor::default().with_ids(Arc::new(SequentialIds::new("id"))))
}
