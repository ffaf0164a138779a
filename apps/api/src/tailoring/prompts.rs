// Prompt constants for the wording advisor.
// Reuses the JSON-only fragment from llm_client::prompts.

/// Role line prepended to the shared JSON-only system prompt.
pub const WORDING_ROLE: &str = "You are a careful resume editor. \
    You choose between pre-approved wording edits; you never write new text.";

/// Wording prompt template. Replace `{jd_title}` and `{bullets_json}` before sending.
pub const WORDING_PROMPT_TEMPLATE: &str = r#"A candidate is applying for the role "{jd_title}".

Each bullet below comes from their resume together with a numbered list of
pre-approved edits. Every edit only re-spells a tool name or adds a category
label next to it; none of them change what the candidate did.

For each bullet pick the edit that reads most naturally for this role, or
null to keep the bullet exactly as written.

Bullets:
{bullets_json}

Return a JSON object with this EXACT schema (no extra fields):
{
  "choices": [
    {"bulletKey": "experience[0].bullets[1]", "candidate": 0}
  ]
}

Rules:
- "bulletKey" must be copied verbatim from the input.
- "candidate" is the zero-based index into that bullet's "candidates", or null.
- Include each bullet at most once. Omitted bullets keep the default edit."#;

pub fn build_wording_prompt(jd_title: &str, bullets_json: &str) -> String {
    WORDING_PROMPT_TEMPLATE
        .replace("{jd_title}", jd_title)
        .replace("{bullets_json}", bullets_json)
}
