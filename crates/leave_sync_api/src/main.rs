use std::sync::Arc;

use anyhow::Context;

use leave_sync::adapters::outbound::lark_calendar::LarkCalendar;
use leave_sync::adapters::outbound::redis_correlation_store::RedisCorrelationStore;
use leave_sync::application::dispatcher::EventDispatcher;
use leave_sync::core::clock::SystemClock;
use leave_sync::shell::config::AppConfig;
use leave_sync::shell::http::router;
use leave_sync::shell::state::AppState;
use leave_sync::shell::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "configuration loaded");

    let store = Arc::new(
        RedisCorrelationStore::connect(&config.redis_url, config.key_namespace.clone())
            .await
            .context("redis unreachable")?,
    );
    let calendar = Arc::new(
        LarkCalendar::new(
            config.lark_base_url.clone(),
            config.app_id.clone(),
            config.app_secret.clone(),
            config.calendar_timeout,
        )
        .context("invalid calendar client configuration")?,
    );

    let dispatcher = EventDispatcher::for_leave_events(calendar, store, Arc::new(SystemClock));
    let state = AppState::new(dispatcher)
        .with_verification_token(config.verification_token.clone())
        .with_encrypt_key(config.encrypt_key.clone());

    let listener = tokio::net::TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.http_addr))?;
    tracing::info!("event callback endpoint: http://{}/webhook/event", config.http_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for ctrl-c");
    }
}
