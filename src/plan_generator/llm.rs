use async_trait::async_trait;

use super::context::{system_prompt, user_prompt};
use super::{validate_plan_shape, GenerationError, PlanGenerator};
use crate::api_connection::{ChatCompletionRequest, ChatMessage, Provider, ResponseFormat};
use crate::catalog::Catalog;
use crate::config::GeneratorConfig;
use crate::models::{GeneratedMealPlan, MealPlanRequest};

/// Plan generator backed by a chat-completion model.
#[derive(Debug, Clone)]
pub struct LlmPlanGenerator {
    provider: Provider,
    config: GeneratorConfig,
}

impl LlmPlanGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let provider = Provider::openrouter_with_base_url(&config.api_key_env_var, &config.base_url);
        LlmPlanGenerator { provider, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn build_request(
        &self,
        request: &MealPlanRequest,
        catalog: &Catalog,
    ) -> Result<ChatCompletionRequest, GenerationError> {
        Ok(ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(system_prompt(request.duration_days)),
                ChatMessage::user(user_prompt(request, catalog, &self.config)?),
            ],
            response_format: Some(ResponseFormat::json_object()),
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
        })
    }
}

/// Removes a surrounding markdown code fence, with or without a `json` tag.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6) {
        return trimmed;
    }
    let inner = &trimmed[3..trimmed.len() - 3];
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

/// Parses raw model output into a plan that satisfies the output guarantee.
/// Totals reported by the model are discarded and re-derived.
pub fn parse_plan_response(
    content: &str,
    request: &MealPlanRequest,
) -> Result<GeneratedMealPlan, GenerationError> {
    let json = strip_code_fence(content);
    if json.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    let mut plan: GeneratedMealPlan = serde_json::from_str(json).map_err(|e| {
        tracing::debug!(error = %e, content = json, "model output did not parse");
        GenerationError::Malformed(e)
    })?;
    validate_plan_shape(&mut plan, request)?;
    plan.summarize();
    Ok(plan)
}

#[async_trait]
impl PlanGenerator for LlmPlanGenerator {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(
        &self,
        request: &MealPlanRequest,
        catalog: &Catalog,
    ) -> Result<GeneratedMealPlan, GenerationError> {
        let chat_request = self.build_request(request, catalog)?;
        let response = self.provider.call_chat_completion(chat_request).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                total_tokens = usage.total_tokens,
                "model usage"
            );
        }
        let content = response.first_content().ok_or(GenerationError::EmptyResponse)?;
        tracing::debug!(content, "raw model response");
        parse_plan_response(content, request)
    }
}
