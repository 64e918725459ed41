pub mod agent;
pub mod audio;
pub mod cli;
pub mod config;
pub mod history;
pub mod llm;
pub mod models;
pub mod server;

use agent::HealthAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Provider: {}", args.chat_provider);
    info!("Chat Model: {}", args.chat_model);
    info!("Location Model: {}", args.location_model);
    info!("TTS Model: {}", args.tts_model);
    info!("History Store Type: {}", args.history_type);
    info!("History Window: {}", args.history_window);
    info!("Default Language: {}", args.default_language);
    info!("Prompts Path: {}", args.prompts_path);
    info!("Alerts Path: {}", args.alerts_path);
    info!("-------------------------");

    let agent = Arc::new(HealthAgent::new(&args).await?);

    if args.repl {
        let session_id = Uuid::new_v4().to_string();
        return cli::repl::run_repl(agent, &session_id).await;
    }

    let alerts = config::alerts::load_alerts(&args.alerts_path)?;
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent, alerts, args);
    server.run().await?;

    Ok(())
}
