use log::info;
use serde::Deserialize;
use std::fs;
use std::sync::Arc;
use thiserror::Error;

/// Base system instruction sent with every chat turn. A deployment can
/// override it through the prompts JSON file.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are HealthBuddy, an AI-driven public health assistant specifically designed for rural and semi-urban populations.
Your goals:
1. Educate users about preventive healthcare.
2. Explain disease symptoms clearly using simple, non-medical language.
3. Provide information about standard vaccination schedules.
4. Advise on when to seek professional medical help (always emphasize that you are an AI assistant and not a doctor).
5. Support multiple Indian languages.

Rules:
- Be empathetic, culturally sensitive, and easy to understand.
- Use bullet points for symptoms and steps.
- If a user reports severe symptoms (e.g., chest pain, difficulty breathing), immediately advise them to call emergency services or visit the nearest hospital.
- Use web search to check for real-time health outbreaks if asked about local news or current diseases.
- When answering about vaccinations, follow the WHO and National Health Mission guidelines.";

pub const DEFAULT_LANGUAGE_DIRECTIVE: &str = "Please respond in the {language} language.";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("language directive template is missing the {{language}} placeholder")]
    MissingLanguagePlaceholder,
    #[error("prompt file IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("prompt JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_language_directive")]
    pub language_directive: String,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_language_directive() -> String {
    DEFAULT_LANGUAGE_DIRECTIVE.to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            language_directive: default_language_directive(),
        }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if !self.language_directive.contains("{language}") {
            return Err(PromptError::MissingLanguagePlaceholder);
        }
        Ok(())
    }

    /// Full system instruction for one turn: base prompt plus the
    /// language directive for the requested locale code.
    pub fn system_instruction(&self, language_code: &str) -> String {
        format!(
            "{}\n{}",
            self.system_prompt,
            self.language_directive.replace("{language}", language_code)
        )
    }
}

/// Loads prompt templates from `path`, falling back to the built-in
/// templates when no override file exists.
pub fn load_prompts(path: &str) -> Result<Arc<PromptConfig>, PromptError> {
    let config = match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str::<PromptConfig>(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No prompt override at '{}', using built-in templates", path);
            PromptConfig::default()
        }
        Err(e) => {
            return Err(e.into());
        }
    };
    config.validate()?;
    Ok(Arc::new(config))
}
