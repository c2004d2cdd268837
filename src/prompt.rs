use crate::config::RefactorConfig;

/// Instruction sent alongside the user's prompt on every extraction.
///
/// `{segments}` and `{alternatives}` are filled from [`RefactorConfig`].
pub const REFACTOR_SYSTEM_PROMPT: &str = r#"You are a prompt engineering expert. The user gives you an image generation prompt.
Pick {segments} short phrases from it and suggest {alternatives} alternatives for each.

Reply ONLY with this exact JSON format:
{"segments":[{"original":"phrase from prompt","alternatives":["alt1","alt2","alt3"]}]}

Rules:
- No explanation, no markdown, no thinking, ONLY the JSON object
- "original" must be an exact substring from the user's prompt
- Exactly {segments} segments, exactly {alternatives} alternatives each"#;

/// Replace `{key}` placeholders in `template` with the given values.
///
/// Unknown placeholders are left as-is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{}}}", key);
        rendered = rendered.replace(&placeholder, value);
    }
    rendered
}

/// The system prompt for the given limits.
pub fn system_prompt(config: &RefactorConfig) -> String {
    let segments = config.max_segments.to_string();
    let alternatives = config.max_alternatives.to_string();
    render(
        REFACTOR_SYSTEM_PROMPT,
        &[("segments", segments.as_str()), ("alternatives", alternatives.as_str())],
    )
}
