use log::{ error, info };
use std::error::Error;
use std::sync::Arc;

use crate::audio;
use crate::cli::Args;
use crate::config::prompt::{ self, PromptConfig };
use crate::history::{ initialize_history_store, HistoryStore };
use crate::llm::chat::{ new_client, ChatClient, ChatOutcome, ChatRequest, ImagePart, Turn, TurnRole };
use crate::llm::LlmConfig;
use crate::models::chat::{ Conversation, Message, MessageRole };

/// Fixed reply when the upstream call fails for any reason. Transport
/// and parsing faults never propagate past the agent.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble connecting to the health database. Please try again in a moment.";

/// Stored in place of user text when only an image was supplied.
const IMAGE_ONLY_CAPTION: &str = "Checking this image...";

/// Substring heuristic for location-flavoured queries. Known-fragile
/// ("nearly" matches), preserved as-is.
const LOCATION_KEYWORDS: [&str; 2] = ["near", "around"];

pub struct HealthAgent {
    chat_client: Arc<dyn ChatClient>,
    history_store: Arc<dyn HistoryStore>,
    prompt_config: Arc<PromptConfig>,
    chat_model: String,
    location_model: String,
    history_window: usize,
    default_language: String,
}

impl HealthAgent {
    pub async fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let llm_config = LlmConfig::from_args(args);
        let chat_client = new_client(&args.chat_provider, &llm_config)?;
        info!(
            "Chat client configured: Provider={}, Model={}, LocationModel={}, TtsModel={}",
            args.chat_provider,
            args.chat_model,
            args.location_model,
            args.tts_model
        );

        let history_store = initialize_history_store(args)?;
        let prompt_config = prompt::load_prompts(&args.prompts_path)?;

        Ok(Self {
            chat_client,
            history_store,
            prompt_config,
            chat_model: args.chat_model.clone(),
            location_model: args.location_model.clone(),
            history_window: args.history_window,
            default_language: args.default_language.clone(),
        })
    }

    pub fn is_location_query(text: &str) -> bool {
        let lowered = text.to_lowercase();
        LOCATION_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
    }

    /// The external vocabulary has only user/model; internal system
    /// messages fold into user.
    fn map_role(role: MessageRole) -> TurnRole {
        match role {
            MessageRole::Assistant => TurnRole::Model,
            MessageRole::User | MessageRole::System => TurnRole::User,
        }
    }

    fn build_request(
        &self,
        text: &str,
        image: Option<ImagePart>,
        window: &[Message],
        language: &str
    ) -> ChatRequest {
        let mut turns: Vec<Turn> = window
            .iter()
            .map(|message| Turn {
                role: Self::map_role(message.role),
                text: message.content.clone(),
                image: None,
            })
            .collect();
        turns.push(Turn {
            role: TurnRole::User,
            text: text.to_string(),
            image,
        });

        let location = Self::is_location_query(text);
        ChatRequest {
            model: if location {
                self.location_model.clone()
            } else {
                self.chat_model.clone()
            },
            system_instruction: self.prompt_config.system_instruction(language),
            turns,
            web_search: true,
            maps_search: location,
        }
    }

    /// Runs one chat turn: append the user message, send the recent
    /// window upstream, append and return the assistant reply. Errors
    /// from the model call degrade to the fixed fallback reply.
    pub async fn chat(
        &self,
        session_id: &str,
        text: &str,
        image: Option<ImagePart>,
        language: Option<&str>
    ) -> Result<Message, Box<dyn Error + Send + Sync>> {
        let trimmed = text.trim();
        if trimmed.is_empty() && image.is_none() {
            return Err("Message text and image are both empty".into());
        }
        let language = language.unwrap_or(&self.default_language);
        let content = if trimmed.is_empty() { IMAGE_ONLY_CAPTION } else { trimmed };

        // Window is read before the new turn is appended; the new
        // utterance travels as the final turn of the request instead.
        let window = self.history_store
            .conversation(session_id, self.history_window).await?
            .messages;
        self.history_store.append(session_id, Message::user(content)).await?;

        let request = self.build_request(trimmed, image, &window, language);
        info!(
            "Dispatching chat turn: session={} model={} turns={}",
            session_id,
            request.model,
            request.turns.len()
        );

        let outcome = match self.chat_client.generate(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Chat completion failed: {}", e);
                ChatOutcome { text: FALLBACK_REPLY.to_string(), sources: None }
            }
        };

        let reply = Message::assistant(outcome.text, outcome.sources);
        self.history_store.append(session_id, reply.clone()).await?;
        Ok(reply)
    }

    /// Synthesizes speech for `text`, returning base64 PCM16 audio.
    pub async fn synthesize(
        &self,
        text: &str,
        language: Option<&str>
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let language = language.unwrap_or(&self.default_language);
        self.chat_client.synthesize_speech(text, language).await
    }

    /// Synthesizes and plays `text` through the local output device.
    pub async fn speak(
        &self,
        text: &str,
        language: Option<&str>
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let payload = self.synthesize(text, language).await?;
        let samples = audio::decode_pcm16(&payload)?;
        tokio::task::spawn_blocking(move || audio::play_pcm16(samples)).await??;
        Ok(())
    }

    pub async fn conversation(
        &self,
        session_id: &str
    ) -> Result<Conversation, Box<dyn Error + Send + Sync>> {
        self.history_store.conversation(session_id, 0).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryStore;
    use crate::models::chat::Source;
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use std::sync::Mutex;

    struct MockChatClient {
        outcome: Mutex<Vec<Result<ChatOutcome, String>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl MockChatClient {
        fn replying(outcomes: Vec<Result<ChatOutcome, String>>) -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(outcomes),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn text_reply(text: &str) -> Arc<Self> {
            Self::replying(
                vec![Ok(ChatOutcome { text: text.to_string(), sources: None })]
            )
        }

        fn last_request(&self) -> ChatRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ChatClient for MockChatClient {
        async fn generate(
            &self,
            request: &ChatRequest
        ) -> Result<ChatOutcome, Box<dyn Error + Send + Sync>> {
            self.requests.lock().unwrap().push(request.clone());
            self.outcome
                .lock()
                .unwrap()
                .remove(0)
                .map_err(|message| message.into())
        }

        async fn synthesize_speech(
            &self,
            _text: &str,
            _language: &str
        ) -> Result<String, Box<dyn Error + Send + Sync>> {
            Ok(BASE64.encode([0u8, 0, 0, 64]))
        }
    }

    fn agent_with(client: Arc<MockChatClient>) -> HealthAgent {
        HealthAgent {
            chat_client: client,
            history_store: Arc::new(crate::history::memory::MemoryHistoryStore::new()),
            prompt_config: Arc::new(PromptConfig::default()),
            chat_model: "gemini-3-flash-preview".to_string(),
            location_model: "gemini-2.5-flash".to_string(),
            history_window: 6,
            default_language: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn first_turn_sends_single_user_turn_with_language_directive() {
        let client = MockChatClient::text_reply("Dengue symptoms include fever, headache...");
        let agent = agent_with(client.clone());

        let reply = agent.chat("s1", "What are symptoms of dengue?", None, None).await.unwrap();

        let request = client.last_request();
        assert_eq!(request.turns.len(), 1);
        assert_eq!(request.turns[0].role, TurnRole::User);
        assert_eq!(request.turns[0].text, "What are symptoms of dengue?");
        assert!(request.system_instruction.contains("HealthBuddy"));
        assert!(request.system_instruction.ends_with("Please respond in the en language."));
        assert!(request.web_search);
        assert!(!request.maps_search);

        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.content, "Dengue symptoms include fever, headache...");
        assert!(reply.sources.is_none());

        // history gained exactly one user and one assistant message
        let stored = agent.conversation("s1").await.unwrap().messages;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].role, MessageRole::User);
        assert_eq!(stored[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_fallback_reply() {
        let client = MockChatClient::replying(vec![Err("connection refused".to_string())]);
        let agent = agent_with(client);

        let reply = agent.chat("s1", "What are symptoms of dengue?", None, None).await.unwrap();
        assert_eq!(reply.content, FALLBACK_REPLY);
        assert!(reply.sources.is_none());

        // the fallback reply is still recorded in history
        let stored = agent.conversation("s1").await.unwrap().messages;
        assert_eq!(stored[1].content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn long_history_is_truncated_to_recent_window() {
        let client = MockChatClient::replying(
            (0..7)
                .map(|i| Ok(ChatOutcome { text: format!("reply {}", i), sources: None }))
                .collect()
        );
        let agent = agent_with(client.clone());

        for i in 0..7 {
            agent.chat("s1", &format!("question {}", i), None, None).await.unwrap();
        }

        // 12 stored messages precede the last turn; only 6 may travel.
        let request = client.last_request();
        assert_eq!(request.turns.len(), 7);
        assert_eq!(request.turns[0].text, "question 3");
        assert_eq!(request.turns[0].role, TurnRole::User);
        assert_eq!(request.turns[1].text, "reply 3");
        assert_eq!(request.turns[1].role, TurnRole::Model);
        assert_eq!(request.turns[6].text, "question 6");
    }

    #[tokio::test]
    async fn location_keyword_selects_maps_capable_path() {
        let client = MockChatClient::replying(
            vec![
                Ok(ChatOutcome { text: "a".to_string(), sources: None }),
                Ok(ChatOutcome { text: "b".to_string(), sources: None })
            ]
        );
        let agent = agent_with(client.clone());

        agent.chat("s1", "Any clinics NEAR me?", None, None).await.unwrap();
        let request = client.last_request();
        assert_eq!(request.model, "gemini-2.5-flash");
        assert!(request.maps_search);

        agent.chat("s1", "What are symptoms of dengue?", None, None).await.unwrap();
        let request = client.last_request();
        assert_eq!(request.model, "gemini-3-flash-preview");
        assert!(!request.maps_search);
    }

    #[test]
    fn location_heuristic_is_a_case_insensitive_substring_match() {
        assert!(HealthAgent::is_location_query("hospitals ArOuNd here"));
        assert!(HealthAgent::is_location_query("nearly done")); // known false positive
        assert!(!HealthAgent::is_location_query("dengue symptoms"));
    }

    #[test]
    fn assistant_maps_to_model_and_system_folds_into_user() {
        assert_eq!(HealthAgent::map_role(MessageRole::Assistant), TurnRole::Model);
        assert_eq!(HealthAgent::map_role(MessageRole::User), TurnRole::User);
        assert_eq!(HealthAgent::map_role(MessageRole::System), TurnRole::User);
    }

    #[tokio::test]
    async fn image_only_turn_stores_caption_and_forwards_image() {
        let client = MockChatClient::text_reply("Looks like a rash.");
        let agent = agent_with(client.clone());
        let image = ImagePart { data: "QUJD".to_string(), mime_type: "image/jpeg".to_string() };

        agent.chat("s1", "  ", Some(image.clone()), None).await.unwrap();

        let request = client.last_request();
        assert_eq!(request.turns[0].text, "");
        assert_eq!(request.turns[0].image, Some(image));

        let stored = agent.conversation("s1").await.unwrap().messages;
        assert_eq!(stored[0].content, IMAGE_ONLY_CAPTION);
    }

    #[tokio::test]
    async fn empty_input_is_rejected_without_touching_history() {
        let client = MockChatClient::text_reply("unused");
        let agent = agent_with(client);

        assert!(agent.chat("s1", "   ", None, None).await.is_err());
        assert!(agent.conversation("s1").await.unwrap().messages.is_empty());
    }

    #[tokio::test]
    async fn explicit_language_overrides_default() {
        let client = MockChatClient::text_reply("उत्तर");
        let agent = agent_with(client.clone());

        agent.chat("s1", "बुखार के लक्षण?", None, Some("hi")).await.unwrap();
        let request = client.last_request();
        assert!(request.system_instruction.ends_with("Please respond in the hi language."));
    }
}
