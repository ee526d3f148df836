// Shared prompt fragments.
// Each feature that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments reused by several templates.

/// Persona line that opens every listing-related prompt.
pub const SEO_SPECIALIST: &str = "You are an expert Etsy SEO and marketing specialist.";

/// Instruction for prompts whose answer is parsed out of a fenced JSON block.
pub const FENCED_JSON_OBJECT: &str = "You MUST respond with a valid JSON object. \
    The JSON object should be enclosed in a single markdown code block (e.g. ```json ... ```).";

/// Words that never belong in a listing title.
pub const BANNED_TITLE_WORDS: &[&str] = &["png", "download", "cute", "instant"];

/// Title ranking rules shared by the primary listing and alternative titles.
pub const TITLE_RULES: &str = "\
      - LENGTH: Strictly between 3 and 14 words long. Max 140 characters.
      - ETSY ALGORITHM STRATEGY:
        1. Exact Match Front-Loading: The first 40 characters are the most critical. Place the highest volume exact-match keyword phrase first.
        2. Distinct Phrases: Use 2-3 strong, distinct phrases separated by commas.
        3. No Keyword Stuffing: Do NOT repeat the same word multiple times (e.g., don't write \"Gold Ring, Gold Jewelry, Gold Gift\". Write \"18k Gold Ring, Minimalist Jewelry, Anniversary Gift\").
      - REFERENCE EXAMPLE: \"Linen Summer Dress, Sleeveless Midi Sundress, Boho Beach Wear\"
      - Avoid subjective adjectives that aren't specific (like \"cute\", \"nice\").";

/// Renders the banned-word rule, e.g. `DO NOT use the words: "png", "download".`
pub fn banned_words_rule() -> String {
    let quoted: Vec<String> = BANNED_TITLE_WORDS
        .iter()
        .map(|w| format!("\"{w}\""))
        .collect();
    format!("DO NOT use the words: {}.", quoted.join(", "))
}
