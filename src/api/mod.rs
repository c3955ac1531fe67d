//! API module for the transcription service
//!
//! Provides the browser page and the REST endpoints behind it.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{build_router, AppState};

/// API Server for handling REST requests
#[derive(Debug)]
pub struct ApiServer {
    config: Arc<Config>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Run the API server until shutdown
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on {}", self.config.bind_address());
        server::start_http_server(self.config).await
    }
}
