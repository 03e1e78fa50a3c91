pub mod error;
pub mod gemini;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::generation::GenerationConfig;
use crate::models::chat::Turn;
use self::gemini::GeminiClient;

pub use self::error::{ FailureKind, LlmError };

/// The external generative-text service.
///
/// `generate` is the stateless single-turn call; `chat` replays `history`
/// before `message`, the way a stateful chat session would.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    async fn chat(&self, history: &[Turn], message: &str) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}

pub fn new_client(
    api_key: Option<String>,
    config: &GenerationConfig
) -> Result<Arc<dyn GenerativeClient>, LlmError> {
    let client = GeminiClient::new(api_key, config.clone())?;
    Ok(Arc::new(client))
}
