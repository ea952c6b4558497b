use crate::frameworks::config::{ConfigError, Settings};
use crate::frameworks::db::{self, StorageInitError, StorageTarget};
use crate::interface_adapters::clients::HttpVoucherUpstream;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::{AppState, StorageStatus, SystemClock};
use crate::use_cases::sessions::SessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::signal;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageInitError),
    #[error("failed to initialize upstream client: {0}")]
    UpstreamClient(#[from] reqwest::Error),
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run() -> Result<(), StartupError> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Settings::from_env()?;

    // Storage must be ready before the relay accepts traffic.
    let pool = db::connect_pool(settings.database_url.as_deref()).await?;
    let target = StorageTarget {
        schema: settings.database_schema.clone(),
        table: settings.database_table.clone(),
    };
    if db::ensure_collection(&pool, &target).await? {
        tracing::info!(schema = %target.schema, table = %target.table, "created collection");
    } else {
        tracing::info!(schema = %target.schema, table = %target.table, "collection already exists");
    }
    let storage = StorageStatus::default();
    storage.mark_ready();
    tracing::info!(schema = %target.schema, "storage ready");

    let upstream = HttpVoucherUpstream::new(settings.upstream.clone(), settings.upstream_timeout)?;
    tracing::debug!(
        voucher_configs = %settings.upstream.voucher_configs,
        freeship_vouchers = %settings.upstream.freeship_vouchers,
        save_voucher = %settings.upstream.save_voucher,
        timeout_ms = settings.upstream_timeout.as_millis(),
        "upstream client configured"
    );

    let state = AppState {
        sessions: Arc::new(SessionStore::new(SystemClock, settings.session_ttl_seconds)),
        upstream: Arc::new(upstream),
        storage,
        session_cookie_name: Arc::from(settings.session_cookie_name.as_str()),
    };

    let app = routes::app(state).layer(routes::cors_layer(&settings.frontend_origin));

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!(%addr, error = %e, "failed to bind"))?;
    tracing::info!(%addr, "listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    pool.close().await;
    tracing::info!("storage connection closed");

    served.inspect_err(|e| tracing::error!(error = %e, "server error"))?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
