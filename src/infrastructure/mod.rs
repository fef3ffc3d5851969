pub mod http;
pub mod llm;
pub mod observability;
