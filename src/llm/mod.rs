pub mod chat;

use crate::cli::Args;

/// Connection settings for the generative language API.
#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub tts_model: String,
    pub tts_voice: String,
}

impl LlmConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            api_key: Some(args.gemini_api_key.clone()).filter(|k| !k.is_empty()),
            base_url: args.gemini_base_url.clone(),
            tts_model: args.tts_model.clone(),
            tts_voice: args.tts_voice.clone(),
        }
    }
}
