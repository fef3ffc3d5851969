use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use super::TracingConfig;

/// Initialize the tracing subscriber with structured logging.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(config: &TracingConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},chat_relay=debug,tower_http=debug",
            config.level
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match (config.json_format, config.stderr) {
        (true, false) => registry
            .with(fmt::layer().json().with_target(true).with_file(true).with_line_number(true))
            .try_init(),
        (true, true) => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        (false, false) => registry
            .with(fmt::layer().with_target(true).with_file(true).with_line_number(true))
            .try_init(),
        (false, true) => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing already initialized: {}", e);
        return;
    }

    tracing::debug!(
        environment = %config.environment,
        json_format = config.json_format,
        level = %config.level,
        "Tracing initialized"
    );
}
