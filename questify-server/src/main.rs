use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use questify_core::Data;
use questify_database::cache::DEFAULT_PROFILE_CACHE_TTL;
use questify_database::{CacheService, Database, MIGRATOR, PgAccountStore};
use questify_oauth::OAuthService;
use questify_progression::{FloorPolicy, ProgressionEngine};
use questify_utils::parse::parse_bool_flag;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let within_info_level = *metadata.level() <= tracing::Level::INFO;
        within_info_level && !metadata.target().starts_with("sqlx::query")
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL")?;
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
    let max_connections = u32::try_from(env_u64("DATABASE_MAX_CONNECTIONS", 5))
        .unwrap_or(u32::MAX)
        .max(1);

    let db_pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await?;
    info!(max_connections, "PostgreSQL connection established.");

    let redis_enabled = env_bool("REDIS_ENABLED", false);
    let redis_key_prefix =
        env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "questify:prod".to_string());

    let mut cache = if redis_enabled {
        match env::var("REDIS_URL") {
            Ok(redis_url) => match CacheService::redis(&redis_url, redis_key_prefix.clone()) {
                Ok(cache) => {
                    info!(key_prefix = %redis_key_prefix, "Redis cache enabled.");
                    cache
                }
                Err(err) => {
                    warn!(?err, key_prefix = %redis_key_prefix, "Failed to initialize Redis cache; using the in-process cache.");
                    CacheService::in_memory(redis_key_prefix.clone())
                }
            },
            Err(_) => {
                warn!(key_prefix = %redis_key_prefix, "REDIS_ENABLED=true but REDIS_URL is missing; using the in-process cache.");
                CacheService::in_memory(redis_key_prefix.clone())
            }
        }
    } else {
        info!("Redis cache disabled (set REDIS_ENABLED=true to enable).");
        CacheService::in_memory(redis_key_prefix.clone())
    };

    let profile_ttl_seconds = env_u64(
        "PROFILE_CACHE_TTL_SECONDS",
        DEFAULT_PROFILE_CACHE_TTL.as_secs(),
    );
    cache.configure_profile_ttl(Duration::from_secs(profile_ttl_seconds));
    info!(
        profile_ttl_seconds = cache.profile_ttl().as_secs(),
        "Profile cache configured."
    );

    if cache.is_redis_enabled() {
        if let Err(err) = cache.ping().await {
            warn!(
                ?err,
                "Redis cache ping failed; cache operations will fall back to the database."
            );
        } else {
            info!("Redis cache health check passed.");
        }
    }

    let db = Database::with_cache(db_pool, cache);

    let auto_run_migrations = env_bool("AUTO_RUN_MIGRATIONS", true);
    if auto_run_migrations {
        MIGRATOR.run(db.pool()).await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    let floor_policy = match env::var("ECONOMY_FLOOR_POLICY") {
        Ok(raw) => raw.parse::<FloorPolicy>()?,
        Err(_) => FloorPolicy::default(),
    };
    info!(%floor_policy, "Economy floor policy configured.");

    let oauth = OAuthService::from_env()?;
    let providers = oauth.enabled_providers();
    if providers.is_empty() {
        info!("Calendar integration disabled (missing GOOGLE_* and MS_* client vars).");
    } else {
        info!(?providers, "Calendar integration enabled.");
    }

    let state = Arc::new(Data {
        accounts: Arc::new(PgAccountStore::new(db.clone())),
        db,
        engine: ProgressionEngine::new(floor_policy),
        oauth,
    });

    let listener = TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, "Questify is listening.");

    axum::serve(listener, questify_api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Questify stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(?err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => parse_bool_flag(&value),
        Err(_) => default,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(value) => value.trim().parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}
