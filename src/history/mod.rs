pub mod memory;

use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::sync::Arc;

use crate::cli::Args;
use crate::models::chat::{ Conversation, Message };

/// Append-only per-session conversation storage. Messages are never
/// mutated or deleted once stored.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(
        &self,
        session_id: &str,
        message: Message
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Returns the most recent `limit` messages in original order.
    /// A limit of 0 returns the whole conversation.
    async fn conversation(
        &self,
        session_id: &str,
        limit: usize
    ) -> Result<Conversation, Box<dyn Error + Send + Sync>>;
}

pub fn create_history_store(
    args: &Args
) -> Result<Arc<dyn HistoryStore>, Box<dyn Error + Send + Sync>> {
    match args.history_type.to_lowercase().as_str() {
        "memory" => Ok(Arc::new(memory::MemoryHistoryStore::new())),
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported history store type: {}", args.history_type)
                    )
                )
            ),
    }
}

pub fn initialize_history_store(
    args: &Args
) -> Result<Arc<dyn HistoryStore>, Box<dyn Error + Send + Sync>> {
    info!("Chat history will be stored in: {} (per-session, not persisted)", args.history_type);
    create_history_store(args)
}
