use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use chat_core::Config;
use conversation_store::ConversationStore;
use log::{info, warn};
use persona_filter::{LogAuditSink, PersonaFilter};
use upstream_client::UpstreamClient;

use crate::controllers::{chat_controller, system_controller};
use crate::services::ChatService;

pub struct AppState {
    pub store: Arc<ConversationStore>,
    pub upstream: Option<Arc<UpstreamClient>>,
    pub filter: Arc<PersonaFilter>,
    pub admin_bypass: bool,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let upstream = match UpstreamClient::from_config(config) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                // The server still starts; each chat request fails with a
                // configuration error until a key is provided.
                warn!("Upstream client unavailable: {}", e);
                None
            }
        };
        let mut filter = PersonaFilter::new();
        if config.audit_log {
            filter = filter.with_audit_sink(Arc::new(LogAuditSink));
        }
        Self {
            store: Arc::new(ConversationStore::new()),
            upstream,
            filter: Arc::new(filter),
            admin_bypass: config.admin_bypass,
        }
    }

    /// Per-request service over the shared state.
    pub fn chat_service(&self) -> ChatService {
        ChatService::new(
            Arc::clone(&self.store),
            self.upstream.clone(),
            Arc::clone(&self.filter),
            self.admin_bypass,
        )
    }
}

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1")
            .configure(chat_controller::config)
            .configure(system_controller::config),
    );
}

pub async fn run(host: &str, port: u16, config: Config) -> Result<(), String> {
    info!("Starting web service...");

    let app_state = web::Data::new(AppState::from_config(&config));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .bind((host, port))
    .map_err(|e| format!("Failed to bind server: {e}"))?
    .run();

    info!("Web service listening on http://{host}:{port}");

    server
        .await
        .map_err(|e| format!("Web server error: {e}"))
}
