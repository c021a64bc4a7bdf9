// src/llm/prompt.rs

const SUGGESTION_SCHEMA: &str =
    r#"{"suggestions": [{"command": "<shell command>", "description": "<one short sentence>"}]}"#;
const EXPLAIN_SCHEMA: &str = r#"{"explanation": "<plain-language explanation>"}"#;

/// Instruction text asking the model for `count` command suggestions.
pub fn build_suggestion_prompt(user_text: &str, count: usize) -> String {
    let count = count.max(1);
    let noun = if count == 1 { "suggestion" } else { "suggestions" };

    format!(
        "You are a command-line assistant that turns natural-language requests into shell commands.\n\
         Respond with a single JSON object and nothing else: no markdown, no commentary.\n\
         The JSON object must match this schema exactly:\n\
         {schema}\n\
         Return exactly {count} {noun}, ordered from most to least relevant.\n\
         Each command must be runnable as-is in a POSIX shell.\n\
         \n\
         Request:\n\
         \"\"\"\n\
         {user_text}\n\
         \"\"\"\n",
        schema = SUGGESTION_SCHEMA,
        count = count,
        noun = noun,
        user_text = user_text,
    )
}

/// Instruction text asking the model to explain `command`.
pub fn build_explain_prompt(command: &str) -> String {
    format!(
        "You are a command-line assistant that explains shell commands.\n\
         Respond with a single JSON object and nothing else: no markdown, no commentary.\n\
         The JSON object must match this schema exactly:\n\
         {schema}\n\
         Describe what the command does, including each flag and pipeline stage.\n\
         \n\
         Command:\n\
         \"\"\"\n\
         {command}\n\
         \"\"\"\n",
        schema = EXPLAIN_SCHEMA,
        command = command,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_prompt_embeds_request() {
        let prompt = build_suggestion_prompt("find large files", 3);
        assert!(prompt.contains("\"\"\"\nfind large files\n\"\"\""));
        assert!(prompt.contains("exactly 3 suggestions"));
        assert!(prompt.contains(SUGGESTION_SCHEMA));
    }

    #[test]
    fn test_suggestion_count_clamped() {
        let prompt = build_suggestion_prompt("list files", 0);
        assert!(prompt.contains("exactly 1 suggestion,"));
    }

    #[test]
    fn test_prompts_are_deterministic() {
        assert_eq!(
            build_suggestion_prompt("x", 2),
            build_suggestion_prompt("x", 2)
        );
        assert_eq!(build_explain_prompt("ls -la"), build_explain_prompt("ls -la"));
    }

    #[test]
    fn test_explain_prompt() {
        let prompt = build_explain_prompt("tar -xzf a.tgz");
        assert!(prompt.contains("\"\"\"\ntar -xzf a.tgz\n\"\"\""));
        assert!(prompt.contains(EXPLAIN_SCHEMA));
    }
}
