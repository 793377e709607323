//! ivy-help-bot server binary.
//!
//! Loads configuration from the environment, connects PostgreSQL (and Redis
//! when configured), then serves the WhatsApp webhook until Ctrl-C.

use std::sync::Arc;

use anyhow::Context as _;
use redis::aio::MultiplexedConnection;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ivy_help_bot::adapters::ai::{LlmAdmissionAssistant, OpenAIConfig, OpenAIProvider};
use ivy_help_bot::adapters::http::{build_router, WebhookAppState};
use ivy_help_bot::adapters::postgres::{
    PostgresAdmissionRepository, PostgresAppointmentRepository, PostgresContactDirectory,
    PostgresMessageLog,
};
use ivy_help_bot::adapters::rate_limiter::{
    InMemoryRateLimiter, RateLimitConfig, RedisRateLimiter, WindowLimit,
};
use ivy_help_bot::adapters::storage::{InMemorySessionStore, RedisSessionStore};
use ivy_help_bot::adapters::whatsapp::{WebhookVerifier, WhatsAppCloudClient, WhatsAppConfig};
use ivy_help_bot::application::{
    ConversationEngine, ConversationPorts, EngineSettings, InboundDispatcher,
    InboundMessageHandler,
};
use ivy_help_bot::config::{AppConfig, RedisConfig};
use ivy_help_bot::domain::conversation::FaqDocument;
use ivy_help_bot::domain::foundation::Timestamp;
use ivy_help_bot::ports::{MessagingGateway, RateLimiter, SessionStore};

const IN_MEMORY_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config);
    config.validate().context("invalid configuration")?;

    let started_at = Timestamp::now();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting ivy-help-bot");

    // Database
    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await
        .context("failed to connect to PostgreSQL")?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;
        tracing::info!("Database migrations applied");
    }

    // Sessions and throttling
    let limits = RateLimitConfig {
        global: WindowLimit::per_minute(config.bot.global_messages_per_minute),
        per_sender: WindowLimit::per_minute(config.bot.messages_per_minute),
    };
    let (sessions, rate_limiter): (Arc<dyn SessionStore>, Arc<dyn RateLimiter>) =
        match &config.redis {
            Some(redis_config) => {
                let conn = connect_redis(redis_config).await?;
                tracing::info!("Using Redis for sessions and rate limits");
                (
                    Arc::new(RedisSessionStore::new(conn.clone(), redis_config.session_ttl_secs)),
                    Arc::new(RedisRateLimiter::new(conn, limits)),
                )
            }
            None => {
                tracing::warn!("Redis not configured, sessions are kept in memory");
                (
                    Arc::new(InMemorySessionStore::with_ttl(IN_MEMORY_SESSION_TTL_SECS)),
                    Arc::new(InMemoryRateLimiter::new(limits)),
                )
            }
        };

    // External services
    let api_key = config.ai.openai_api_key.clone().unwrap_or_default();
    let provider = OpenAIProvider::new(
        OpenAIConfig::new(api_key)
            .with_model(&config.ai.model)
            .with_base_url(&config.ai.base_url)
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )
    .context("failed to build AI client")?;

    let messenger: Arc<dyn MessagingGateway> = Arc::new(
        WhatsAppCloudClient::new(
            WhatsAppConfig::new(
                &config.whatsapp.access_token,
                &config.whatsapp.phone_number_id,
            )
            .with_base_url(&config.whatsapp.api_base_url)
            .with_timeout(config.whatsapp.timeout()),
        )
        .context("failed to build WhatsApp client")?,
    );

    // Conversation
    let settings = EngineSettings {
        slot_window: config
            .scheduling
            .slot_window()
            .context("invalid scheduling settings")?,
        default_grade: config.bot.default_grade.clone(),
    };
    let engine = ConversationEngine::new(ConversationPorts {
        sessions,
        assistant: Arc::new(LlmAdmissionAssistant::new(Arc::new(provider))),
        messenger: messenger.clone(),
        admissions: Arc::new(PostgresAdmissionRepository::new(pool.clone())),
        appointments: Arc::new(PostgresAppointmentRepository::new(pool.clone())),
        contacts: Arc::new(PostgresContactDirectory::new(pool.clone())),
    })
    .with_settings(settings)
    .with_faq(FaqDocument::load(&config.bot.faq_path));

    let inbound = InboundMessageHandler::new(
        Arc::new(engine),
        rate_limiter,
        Arc::new(PostgresMessageLog::new(pool.clone())),
        messenger,
        started_at,
    );

    let state = WebhookAppState {
        dispatcher: InboundDispatcher::new(Arc::new(inbound)),
        verifier: WebhookVerifier::new(
            &config.whatsapp.verify_token,
            &config.whatsapp.app_secret,
        ),
    };
    let app = build_router(state, config.server.request_timeout());

    let address = config.server.socket_addr()?;
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!(%address, "Listening for WhatsApp webhooks");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("Shut down");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn connect_redis(config: &RedisConfig) -> anyhow::Result<MultiplexedConnection> {
    let client = redis::Client::open(config.url.as_str()).context("invalid Redis URL")?;
    let conn = tokio::time::timeout(
        config.timeout(),
        client.get_multiplexed_tokio_connection(),
    )
    .await
    .context("timed out connecting to Redis")?
    .context("failed to connect to Redis")?;
    Ok(conn)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
