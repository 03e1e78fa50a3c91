use std::sync::Arc;
use log::debug;

use crate::llm::{ GenerativeClient, LlmError };
use crate::models::api::AskRequest;

/// Forwards one question to the generative service. Holds no per-conversation state.
#[derive(Clone)]
pub struct Relay {
    client: Arc<dyn GenerativeClient>,
}

impl Relay {
    pub fn new(client: Arc<dyn GenerativeClient>) -> Self {
        Self { client }
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    pub async fn answer(&self, request: &AskRequest) -> Result<String, LlmError> {
        match &request.history {
            Some(history) => {
                debug!("Relaying question with {} turns of history", history.len());
                self.client.chat(history, &request.question).await
            }
            None => {
                debug!("Relaying standalone question");
                self.client.generate(&request.question).await
            }
        }
    }
}
