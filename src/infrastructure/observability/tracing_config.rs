use crate::presentation::config::LoggingSettings;

/// Configuration for tracing initialization.
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    pub level: String,
    /// Log to stderr so stdout stays free for the chat transcript.
    pub stderr: bool,
}

impl TracingConfig {
    pub fn from_settings(logging: &LoggingSettings, environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            json_format: logging.enable_json || Self::default().json_format,
            level: logging.level.clone(),
            stderr: false,
        }
    }

    pub fn to_stderr(mut self) -> Self {
        self.stderr = true;
        self
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string()),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            level: "info".to_string(),
            stderr: false,
        }
    }
}
