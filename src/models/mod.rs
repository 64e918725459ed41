pub mod alert;
pub mod chat;
