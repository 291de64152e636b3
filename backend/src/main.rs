use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studio_backend::{
    config::Config,
    db::{connection::create_pool, redis::create_redis_pool},
    repositories::user::PgUserStore,
    router,
    services::{
        mailer::ContactMailer,
        session::{MemorySessionStore, RedisSessionStore, SessionStore},
        turnstile::TurnstileClient,
    },
    state::AppState,
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        jwt_secret = %mask_secret(config.jwt_secret.as_deref().unwrap_or("")),
        public_base_url = %config.public_base_url,
        turnstile_site_key = %config.turnstile_site_key.as_deref().unwrap_or("<dummy>"),
        "Loaded configuration from environment/.env"
    );

    // Initialize database
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&*pool).await?;

    // Session store: Redis when configured, in-process map otherwise
    let sessions: Arc<dyn SessionStore> = match create_redis_pool(&config).await? {
        Some(redis) => Arc::new(RedisSessionStore::new(redis)),
        None => Arc::new(MemorySessionStore::new()),
    };

    let state = AppState::new(
        Arc::new(PgUserStore::new(pool)),
        sessions,
        Arc::new(TurnstileClient::from_config(&config)),
        Arc::new(ContactMailer::from_config(&config)),
        config.clone(),
    );

    let app = router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
