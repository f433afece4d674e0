//! CRM connector gateway entry point
//!
//! Loads configuration, establishes the backend session (password mode) or
//! prepares the session table (OAuth mode), then serves the connector routes
//! until SIGINT/SIGTERM. In-flight requests get `shutdown_timeout` seconds.

mod config;
mod error;
mod logging;
mod middleware;
mod routes;
mod state;

use std::process::ExitCode;
use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, middleware::from_fn, web};
use anyhow::Context;
use crm_connector_core::InMemorySessionStore;
use crm_connector_provider::{CrmProvider, ProviderCredentials, SalesforceProvider, mask_secret};

use crate::config::AppConfig;
use crate::state::AppState;

#[actix_web::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            // 日志尚未初始化
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match logging::init(&config.log) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => {
            tracing::info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let provider: Arc<dyn CrmProvider> = Arc::new(
        SalesforceProvider::new(&config.login_url).context("failed to create HTTP client")?,
    );

    let state = match &config.credentials {
        ProviderCredentials::Password(credentials) => {
            tracing::info!(
                "Logging in to {} as {}",
                config.login_url,
                credentials.username
            );
            let session = provider
                .login(credentials)
                .await
                .context("Salesforce login failed")?;
            tracing::info!(
                instance = %session.instance_url,
                user = ?session.user_id,
                token = %mask_secret(session.access_token()),
                "Connected to Salesforce"
            );
            AppState::password(provider, session)
        }
        ProviderCredentials::OAuth(app) => {
            tracing::info!(
                "OAuth mode: browser sessions authorize via /auth/login (client {})",
                mask_secret(&app.client_id)
            );
            AppState::oauth(
                provider,
                app.clone(),
                Arc::new(InMemorySessionStore::new()),
                config.cookie_secure,
            )
        }
    };

    let oauth = state.auth().is_some();
    let state = web::Data::new(state);
    let body_limit = config.server.body_limit;

    tracing::info!(
        "Listening on http://{}:{} ({} workers, auth: {})",
        config.server.host,
        config.server.port,
        config.server.workers,
        config.auth_type()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(from_fn(middleware::cors))
            .wrap(Logger::default())
            .configure(|cfg| routes::configure(cfg, body_limit, oauth))
    })
    .workers(config.server.workers)
    .shutdown_timeout(config.server.shutdown_timeout)
    .bind((config.server.host.as_str(), config.server.port))
    .with_context(|| {
        format!(
            "failed to bind {}:{}",
            config.server.host, config.server.port
        )
    })?
    .run()
    .await
    .context("server error")
}
