pub mod api;

use std::error::Error;
use std::sync::Arc;

use crate::agent::HealthAgent;
use crate::cli::Args;
use crate::models::alert::HealthAlert;

pub struct Server {
    addr: String,
    agent: Arc<HealthAgent>,
    alerts: Arc<Vec<HealthAlert>>,
    args: Args,
}

impl Server {
    pub fn new(addr: String, agent: Arc<HealthAgent>, alerts: Vec<HealthAlert>, args: Args) -> Self {
        Self {
            addr,
            agent,
            alerts: Arc::new(alerts),
            args,
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(
            &self.addr,
            self.agent.clone(),
            self.alerts.clone(),
            self.args.server_api_key.clone()
        ).await
    }
}
