//! `WordingAdvisor` backed by the Claude API.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::llm_client::prompts::json_system;
use crate::llm_client::{LlmClient, LlmError};
use crate::tailoring::prompts::{build_wording_prompt, WORDING_ROLE};
use crate::tailoring::wording::{BulletCandidates, WordingAdvisor, WordingChoice};

#[derive(Debug, Deserialize)]
struct AdviceResponse {
    #[serde(default)]
    choices: Vec<WordingChoice>,
}

pub struct LlmWordingAdvisor {
    llm: LlmClient,
}

impl LlmWordingAdvisor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl WordingAdvisor for LlmWordingAdvisor {
    async fn choose(
        &self,
        jd_title: &str,
        bullets: &[BulletCandidates],
    ) -> Result<Vec<WordingChoice>, LlmError> {
        let bullets_json = serde_json::to_string_pretty(bullets)?;
        let prompt = build_wording_prompt(jd_title, &bullets_json);
        let system = json_system(WORDING_ROLE);

        debug!(bullets = bullets.len(), "Requesting wording advice");
        let response: AdviceResponse = self.llm.call_json(&prompt, &system).await?;
        Ok(response.choices)
    }
}
