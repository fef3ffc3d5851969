use chat_relay::infrastructure::llm::{GeneratorFactory, GeneratorFactoryError};
use chat_relay::presentation::config::{LlmProvider, Settings};

use futures::stream::StreamExt;

use chat_relay::domain::Message;

fn llm_settings(provider: LlmProvider) -> chat_relay::presentation::config::LlmSettings {
    let mut settings = Settings::defaults().unwrap().llm;
    settings.provider = provider;
    settings
}

#[tokio::test]
async fn given_mock_provider_when_creating_then_generator_echoes_latest_message() {
    let generator = GeneratorFactory::create(&llm_settings(LlmProvider::Mock))
        .await
        .unwrap();

    let answer = generator.complete(&[Message::user("ping")]).await.unwrap();
    let streamed: Vec<String> = generator
        .complete_stream(&[Message::user("ping pong")])
        .await
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(answer, "Echo: ping");
    assert_eq!(streamed.concat(), "Echo: ping pong");
    assert!(streamed.len() > 1);
}

#[tokio::test]
async fn given_openrouter_without_key_when_creating_then_reports_missing_key() {
    let result = GeneratorFactory::create(&llm_settings(LlmProvider::OpenRouter)).await;

    assert!(matches!(
        result,
        Err(GeneratorFactoryError::MissingApiKey("openrouter"))
    ));
}

#[tokio::test]
async fn given_openrouter_with_key_when_creating_then_succeeds() {
    let mut settings = llm_settings(LlmProvider::OpenRouter);
    settings.api_key = "sk-or-test".to_string();

    assert!(GeneratorFactory::create(&settings).await.is_ok());
}

#[tokio::test]
async fn given_lmstudio_without_base_url_when_creating_then_reports_missing_base_url() {
    let result = GeneratorFactory::create(&llm_settings(LlmProvider::LmStudio)).await;

    assert!(matches!(
        result,
        Err(GeneratorFactoryError::MissingBaseUrl("lmstudio"))
    ));
}

#[tokio::test]
async fn given_lmstudio_without_model_when_creating_then_reports_missing_model() {
    let mut settings = llm_settings(LlmProvider::LmStudio);
    settings.base_url = Some("http://localhost:1234/v1".to_string());

    let result = GeneratorFactory::create(&settings).await;

    assert!(matches!(
        result,
        Err(GeneratorFactoryError::MissingModel("lmstudio"))
    ));
}
