mod bedrock_client;
mod generator_factory;
mod mock_text_generator;
mod openai_compatible_client;

pub use bedrock_client::{BedrockClient, DEFAULT_BEDROCK_MODEL, DEFAULT_BEDROCK_REGION};
pub use generator_factory::{GeneratorFactory, GeneratorFactoryError};
pub use mock_text_generator::MockTextGenerator;
pub use openai_compatible_client::OpenAiCompatibleClient;
