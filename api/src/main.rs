mod auth;
mod config;
mod error;
mod extract;
mod handlers;
mod models;
mod payment;
mod rest;
mod store;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::auth::TokenService;
use crate::config::Config;
use crate::payment::{Disabled, PaymentProvider, StripeClient};
use crate::store::{ClassCatalog, EnrollmentWorkflow, PaymentLog, SelectionStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub classes: ClassCatalog,
    pub selections: SelectionStore,
    pub enrollments: EnrollmentWorkflow,
    pub payments: PaymentLog,
    pub tokens: TokenService,
    pub payment_provider: Arc<dyn PaymentProvider>,
}

impl AppState {
    pub fn new(db: SqlitePool, tokens: TokenService, payment_provider: Arc<dyn PaymentProvider>) -> Self {
        Self {
            users: UserStore::new(db.clone()),
            classes: ClassCatalog::new(db.clone()),
            selections: SelectionStore::new(db.clone()),
            enrollments: EnrollmentWorkflow::new(db.clone()),
            payments: PaymentLog::new(db),
            tokens,
            payment_provider,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "summer_camp=debug,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = store::connect(&config.database_url).await?;

    let payment_provider: Arc<dyn PaymentProvider> = match &config.stripe_secret_key {
        Some(key) => Arc::new(StripeClient::new(key.clone())),
        None => {
            tracing::warn!("STRIPE_SECRET_KEY not set, payment intents are disabled");
            Arc::new(Disabled)
        }
    };

    let app_state = AppState::new(pool, TokenService::new(&config.token_secret), payment_provider);

    let app = rest::router(app_state, config.request_timeout);
    let addr = config.listen_addr();
    tracing::info!("Summer Camp server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {}", e);
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

    tracing::info!("shutting down");
}
