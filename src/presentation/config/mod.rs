mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ClientSettings, DEFAULT_SYSTEM_PROMPT, LlmProvider, LlmSettings, LoggingSettings,
    RelaySettings, ServerSettings, Settings,
};
