pub mod gemini;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::sync::Arc;

use self::gemini::GeminiChatClient;
use super::LlmConfig;
use crate::models::chat::Source;

/// Role vocabulary of the external model API. Only two values exist
/// upstream; internal system messages are folded into `User`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePart {
    pub data: String,
    pub mime_type: String,
}

#[derive(Clone, Debug)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
    pub image: Option<ImagePart>,
}

/// One fully assembled outbound request: system instruction, ordered
/// turns (new user turn last) and the tool capability flags.
#[derive(Clone, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub system_instruction: String,
    pub turns: Vec<Turn>,
    pub web_search: bool,
    pub maps_search: bool,
}

#[derive(Clone, Debug)]
pub struct ChatOutcome {
    pub text: String,
    /// `None` when the response carried no grounding chunks, so callers
    /// never render an empty references block.
    pub sources: Option<Vec<Source>>,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn generate(
        &self,
        request: &ChatRequest
    ) -> Result<ChatOutcome, Box<dyn StdError + Send + Sync>>;

    /// Synthesizes speech for `text`, returning base64-encoded
    /// little-endian PCM16 mono audio at 24 kHz.
    async fn synthesize_speech(
        &self,
        text: &str,
        language: &str
    ) -> Result<String, Box<dyn StdError + Send + Sync>>;
}

pub fn new_client(
    provider: &str,
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    match provider.to_lowercase().as_str() {
        "gemini" => {
            let client = GeminiChatClient::from_config(config);
            Ok(Arc::new(client))
        }
        other => Err(format!("Unsupported chat provider: {}", other).into()),
    }
}
