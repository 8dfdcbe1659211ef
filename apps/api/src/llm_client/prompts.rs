// Cross-cutting prompt fragments. Each scanner that prompts a model keeps its
// own template next to it and appends these.

/// Instruction that asks for a bare JSON object.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
