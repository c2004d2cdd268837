//! Ask a chat model for rewrite suggestions and apply the first alternative
//! of every segment.
//!
//! ```text
//! REFACTOR_LLM_API_KEY=sk-... cargo run --example refactor_prompt -- "a cat on a warm windowsill"
//! ```

use prompt_refactor::prompt::system_prompt;
use prompt_refactor::{
    build_modified_prompt, extract_segments, ChatClient, LlmConfig, RefactorConfig,
    SelectedAlternatives,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "A cinematic sunset over a quiet harbor, oil painting".to_string());

    let config = LlmConfig::from_env();
    println!("Using {} at {}", config.model, config.endpoint);
    let client = ChatClient::new(reqwest::Client::new(), config);

    let raw = client
        .complete(&system_prompt(&RefactorConfig::default()), &prompt)
        .await?;
    let result = extract_segments(&raw, &prompt)?;

    let mut selections = SelectedAlternatives::new();
    for segment in &result.segments {
        println!(
            "[{}..{}] {:?}",
            segment.start_index, segment.end_index, segment.original
        );
        for alt in &segment.alternatives {
            println!("    - {}", alt.text);
        }
        if let Some(first) = segment.alternatives.first() {
            selections.insert(segment.id.clone(), first.id.clone());
        }
    }

    println!("\nOriginal: {}", prompt);
    println!(
        "Modified: {}",
        build_modified_prompt(&prompt, &result.segments, &selections)
    );
    Ok(())
}
