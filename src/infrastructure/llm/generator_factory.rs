use std::sync::Arc;

use crate::application::ports::TextGenerator;
use crate::presentation::config::{LlmProvider, LlmSettings};

use super::{
    BedrockClient, DEFAULT_BEDROCK_MODEL, MockTextGenerator, OpenAiCompatibleClient,
};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
const OPENROUTER_DEFAULT_MODEL: &str = "meta-llama/llama-3.1-8b-instruct:free";

pub struct GeneratorFactory;

#[derive(Debug, thiserror::Error)]
pub enum GeneratorFactoryError {
    #[error("missing API key: {0} provider requires llm.api_key")]
    MissingApiKey(&'static str),
    #[error("base_url required for {0} provider")]
    MissingBaseUrl(&'static str),
    #[error("model required for {0} provider")]
    MissingModel(&'static str),
}

impl GeneratorFactory {
    pub async fn create(
        settings: &LlmSettings,
    ) -> Result<Arc<dyn TextGenerator>, GeneratorFactoryError> {
        let params = settings.generation_params();
        let system_prompt = settings.system_prompt.clone();

        match settings.provider {
            LlmProvider::Bedrock => {
                let model = settings
                    .model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BEDROCK_MODEL.to_string());
                tracing::info!(model = %model, region = %settings.region, "Using Bedrock provider");
                let client =
                    BedrockClient::from_env(settings.region.clone(), model, params, system_prompt)
                        .await;
                Ok(Arc::new(client))
            }
            LlmProvider::OpenRouter | LlmProvider::OpenAi => {
                let (name, default_url, default_model) = match settings.provider {
                    LlmProvider::OpenRouter => {
                        ("openrouter", OPENROUTER_BASE_URL, OPENROUTER_DEFAULT_MODEL)
                    }
                    _ => ("openai", OPENAI_BASE_URL, OPENAI_DEFAULT_MODEL),
                };
                if settings.api_key.is_empty() {
                    return Err(GeneratorFactoryError::MissingApiKey(name));
                }
                let base_url = settings
                    .base_url
                    .clone()
                    .unwrap_or_else(|| default_url.to_string());
                let model = settings
                    .model
                    .clone()
                    .unwrap_or_else(|| default_model.to_string());
                tracing::info!(provider = name, model = %model, base_url = %base_url, "Using OpenAI-compatible provider");
                Ok(Arc::new(OpenAiCompatibleClient::new(
                    base_url,
                    settings.api_key.clone(),
                    model,
                    params,
                    system_prompt,
                )))
            }
            LlmProvider::LmStudio => {
                let base_url = settings
                    .base_url
                    .clone()
                    .ok_or(GeneratorFactoryError::MissingBaseUrl("lmstudio"))?;
                let model = settings
                    .model
                    .clone()
                    .ok_or(GeneratorFactoryError::MissingModel("lmstudio"))?;
                tracing::info!(model = %model, base_url = %base_url, "Using LM Studio provider");
                Ok(Arc::new(OpenAiCompatibleClient::new(
                    base_url,
                    settings.api_key.clone(),
                    model,
                    params,
                    system_prompt,
                )))
            }
            LlmProvider::Mock => {
                tracing::warn!("Using mock provider: replies echo the latest user message");
                Ok(Arc::new(MockTextGenerator::echo()))
            }
        }
    }
}
