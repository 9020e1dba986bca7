// Shared prompt fragments. Feature modules keep their own prompt templates
// next to the code that uses them.

/// Appended to prompts whose answer is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Return ONLY valid JSON, no additional text.";
