pub mod alerts;
pub mod language;
pub mod prompt;
