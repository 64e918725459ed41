use async_trait::async_trait;
use log::{ info, warn };
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;

use super::{ ChatClient, ChatOutcome, ChatRequest, TurnRole };
use crate::llm::LlmConfig;
use crate::models::chat::Source;

/// Fixed reply when a response arrives without usable text.
pub const EMPTY_RESPONSE_TEXT: &str = "I'm sorry, I couldn't process that request.";

const WEB_TITLE_FALLBACK: &str = "Health Reference";
const MAPS_TITLE_FALLBACK: &str = "Map Location";
const URI_FALLBACK: &str = "#";

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Serialize, Deserialize)]
struct GeminiInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Serialize, Default)]
struct GeminiTool {
    #[serde(rename = "googleSearch", skip_serializing_if = "Option::is_none")]
    google_search: Option<EmptyConfig>,
    #[serde(rename = "googleMaps", skip_serializing_if = "Option::is_none")]
    google_maps: Option<EmptyConfig>,
}

#[derive(Serialize, Default)]
struct EmptyConfig {}

#[derive(Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "responseModalities")]
    response_modalities: Vec<String>,
    #[serde(rename = "speechConfig", skip_serializing_if = "Option::is_none")]
    speech_config: Option<GeminiSpeechConfig>,
}

#[derive(Serialize)]
struct GeminiSpeechConfig {
    #[serde(rename = "voiceConfig")]
    voice_config: GeminiVoiceConfig,
}

#[derive(Serialize)]
struct GeminiVoiceConfig {
    #[serde(rename = "prebuiltVoiceConfig")]
    prebuilt_voice_config: GeminiPrebuiltVoiceConfig,
}

#[derive(Serialize)]
struct GeminiPrebuiltVoiceConfig {
    #[serde(rename = "voiceName")]
    voice_name: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    #[serde(rename = "groundingMetadata")]
    grounding_metadata: Option<GeminiGroundingMetadata>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Deserialize)]
struct GeminiGroundingMetadata {
    #[serde(rename = "groundingChunks", default)]
    grounding_chunks: Vec<GeminiGroundingChunk>,
}

/// A grounding chunk is either web-sourced or map-sourced; both carry
/// the same optional title/uri pair.
#[derive(Deserialize)]
struct GeminiGroundingChunk {
    web: Option<GeminiChunkRef>,
    maps: Option<GeminiChunkRef>,
}

#[derive(Deserialize)]
struct GeminiChunkRef {
    title: Option<String>,
    uri: Option<String>,
}

fn to_wire(request: &ChatRequest) -> GeminiRequest {
    let contents = request.turns
        .iter()
        .map(|turn| {
            let mut parts = Vec::new();
            if !turn.text.is_empty() {
                parts.push(GeminiPart::Text { text: turn.text.clone() });
            }
            if let Some(image) = &turn.image {
                parts.push(GeminiPart::InlineData {
                    inline_data: GeminiInlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.data.clone(),
                    },
                });
            }
            GeminiContent {
                role: match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Model => "model",
                },
                parts,
            }
        })
        .collect();

    let mut tools = Vec::new();
    if request.web_search {
        tools.push(GeminiTool { google_search: Some(EmptyConfig {}), ..Default::default() });
    }
    if request.maps_search {
        tools.push(GeminiTool { google_maps: Some(EmptyConfig {}), ..Default::default() });
    }

    GeminiRequest {
        contents,
        system_instruction: Some(GeminiSystemInstruction {
            parts: vec![GeminiTextPart { text: request.system_instruction.clone() }],
        }),
        tools,
        generation_config: None,
    }
}

fn extract_text(response: &GeminiResponse) -> String {
    let text: String = response.candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content.parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        EMPTY_RESPONSE_TEXT.to_string()
    } else {
        text
    }
}

/// One Source per grounding chunk, input order preserved, no
/// deduplication. An empty or missing chunk list maps to `None`.
fn extract_sources(response: &GeminiResponse) -> Option<Vec<Source>> {
    let chunks = &response.candidates.first()?.grounding_metadata.as_ref()?.grounding_chunks;
    if chunks.is_empty() {
        return None;
    }
    Some(chunks.iter().map(source_from_chunk).collect())
}

fn source_from_chunk(chunk: &GeminiGroundingChunk) -> Source {
    let (reference, title_fallback) = match (&chunk.web, &chunk.maps) {
        (Some(web), _) => (Some(web), WEB_TITLE_FALLBACK),
        (None, Some(maps)) => (Some(maps), MAPS_TITLE_FALLBACK),
        (None, None) => (None, WEB_TITLE_FALLBACK),
    };
    Source {
        title: reference
            .and_then(|r| r.title.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| title_fallback.to_string()),
        uri: reference
            .and_then(|r| r.uri.clone())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| URI_FALLBACK.to_string()),
    }
}

fn extract_audio(response: &GeminiResponse) -> Option<String> {
    response.candidates
        .first()?
        .content.as_ref()?
        .parts.iter()
        .find_map(|part| part.inline_data.as_ref())
        .map(|data| data.data.clone())
}

pub struct GeminiChatClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    tts_model: String,
    tts_voice: String,
}

impl GeminiChatClient {
    pub fn from_config(config: &LlmConfig) -> Self {
        let api_key = config.api_key.clone().unwrap_or_default();
        if api_key.is_empty() {
            warn!("No API key configured; upstream calls will be rejected as unauthenticated");
        }
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tts_model: config.tts_model.clone(),
            tts_voice: config.tts_voice.clone(),
        }
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent?key={}", self.base_url, model, self.api_key)
    }

    async fn post(
        &self,
        model: &str,
        payload: &GeminiRequest
    ) -> Result<GeminiResponse, Box<dyn StdError + Send + Sync>> {
        let response = self.http
            .post(self.generate_url(model))
            .json(payload)
            .send().await?
            .error_for_status()?;
        Ok(response.json::<GeminiResponse>().await?)
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn generate(
        &self,
        request: &ChatRequest
    ) -> Result<ChatOutcome, Box<dyn StdError + Send + Sync>> {
        info!(
            "GeminiChatClient::generate() → model={} turns={} maps_search={}",
            request.model,
            request.turns.len(),
            request.maps_search
        );
        let payload = to_wire(request);
        let response = self.post(&request.model, &payload).await?;
        Ok(ChatOutcome {
            text: extract_text(&response),
            sources: extract_sources(&response),
        })
    }

    async fn synthesize_speech(
        &self,
        text: &str,
        language: &str
    ) -> Result<String, Box<dyn StdError + Send + Sync>> {
        info!("GeminiChatClient::synthesize_speech() → model={}", self.tts_model);
        let payload = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart::Text {
                    text: format!("Speak the following in the {} language: {}", language, text),
                }],
            }],
            system_instruction: None,
            tools: Vec::new(),
            generation_config: Some(GeminiGenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: Some(GeminiSpeechConfig {
                    voice_config: GeminiVoiceConfig {
                        prebuilt_voice_config: GeminiPrebuiltVoiceConfig {
                            voice_name: self.tts_voice.clone(),
                        },
                    },
                }),
            }),
        };
        let response = self.post(&self.tts_model, &payload).await?;
        extract_audio(&response).ok_or_else(|| "Speech response contained no audio payload".into())
    }
}
