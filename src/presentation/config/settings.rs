use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::ports::GenerationParams;
use crate::application::services::{PayloadFormat, RelayMode, RoleMapping};
use crate::infrastructure::llm::DEFAULT_BEDROCK_REGION;

use super::Environment;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub relay: RelaySettings,
    pub logging: LoggingSettings,
    pub client: ClientSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Bedrock,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "lmstudio")]
    LmStudio,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    pub region: String,
    #[serde(default)]
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub system_prompt: String,
}

impl LlmSettings {
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelaySettings {
    pub mode: RelayMode,
    pub assistant_aliases: Vec<String>,
}

impl RelaySettings {
    pub fn role_mapping(&self) -> RoleMapping {
        RoleMapping {
            assistant_aliases: self.assistant_aliases.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    pub relay_url: String,
    #[serde(default)]
    pub payload: PayloadFormat,
}

impl Settings {
    /// Layers built-in defaults, `appsettings.{environment}` (optional) and
    /// `APP__`-prefixed environment variables, e.g. `APP__LLM__PROVIDER=bedrock`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(
                File::with_name(&format!("appsettings.{}", environment))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("relay.assistant_aliases")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("llm.provider", "bedrock")?
            .set_default("llm.region", DEFAULT_BEDROCK_REGION)?
            .set_default("llm.max_tokens", 512)?
            .set_default("llm.temperature", 0.5)?
            .set_default("llm.top_p", 0.9)?
            .set_default("llm.system_prompt", DEFAULT_SYSTEM_PROMPT)?
            .set_default("relay.mode", "batch")?
            .set_default("relay.assistant_aliases", vec!["assistant", "Assistant"])?
            .set_default("logging.level", "info")?
            .set_default("logging.enable_json", false)?
            .set_default("client.relay_url", "http://127.0.0.1:3000/api/chat")
    }
}
