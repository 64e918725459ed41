pub mod repl;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// Chat LLM provider (gemini)
    #[arg(long, env = "CHAT_PROVIDER", default_value = "gemini")]
    pub chat_provider: String,

    /// API key for the generative language API. Unset means calls go
    /// out unauthenticated and are rejected upstream.
    #[arg(long, env = "GEMINI_API_KEY", default_value = "")]
    pub gemini_api_key: String,

    /// Base URL for the generative language API.
    #[arg(
        long,
        env = "GEMINI_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    pub gemini_base_url: String,

    /// Model for general health queries.
    #[arg(long, env = "CHAT_MODEL", default_value = "gemini-3-flash-preview")]
    pub chat_model: String,

    /// Model used when the query looks location-related.
    #[arg(long, env = "LOCATION_MODEL", default_value = "gemini-2.5-flash")]
    pub location_model: String,

    /// Model for speech synthesis.
    #[arg(long, env = "TTS_MODEL", default_value = "gemini-2.5-flash-preview-tts")]
    pub tts_model: String,

    /// Prebuilt voice name for speech synthesis.
    #[arg(long, env = "TTS_VOICE", default_value = "Kore")]
    pub tts_voice: String,

    // --- History Store Args ---
    /// History chat store type (memory)
    #[arg(long, env = "HISTORY_TYPE", default_value = "memory")]
    pub history_type: String,

    /// Number of recent messages forwarded upstream with each turn.
    #[arg(long, env = "HISTORY_WINDOW", default_value = "6")]
    pub history_window: usize,

    // --- General App Args ---
    /// Default response language code (en, hi, bn, te, mr, ta).
    #[arg(long, env = "DEFAULT_LANGUAGE", default_value = "en")]
    pub default_language: String,

    /// Path to the prompt template override file.
    #[arg(long, env = "PROMPTS_PATH", default_value = "json/prompts.json")]
    pub prompts_path: String,

    /// Path to the health alert feed file.
    #[arg(long, env = "ALERTS_PATH", default_value = "json/alerts.json")]
    pub alerts_path: String,

    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Optional API key clients must present in the x-api-key header.
    #[arg(long, env = "SERVER_API_KEY")]
    pub server_api_key: Option<String>,

    /// Run an interactive terminal chat instead of the HTTP server.
    #[arg(long, default_value = "false")]
    pub repl: bool,
}
