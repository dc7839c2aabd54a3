use crate::config::{SimulationConfig, StoreBackend};
use crate::services::{
    InMemoryStore, InvoiceNumberAllocator, MongoDb, SimulationService, SimulationStore,
};
use crate::{build_router, AppState};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

/// Open the configured store. MongoDB gets its indexes before any request.
pub async fn connect_store(
    config: &SimulationConfig,
) -> Result<Arc<dyn SimulationStore>, AppError> {
    match config.store.backend {
        StoreBackend::Mongodb => {
            let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database).await?;
            db.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; simulations are lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

/// Wire the service graph on top of an already opened store.
pub fn build_state(
    config: SimulationConfig,
    store: Arc<dyn SimulationStore>,
) -> Result<AppState, AppError> {
    let allocator = InvoiceNumberAllocator::new(store.clone(), config.invoice.offset()?);
    Ok(AppState {
        config,
        service: SimulationService::new(store, allocator),
    })
}

impl Application {
    pub async fn build(config: SimulationConfig) -> Result<Self, AppError> {
        let store = connect_store(&config).await?;
        let state = build_state(config.clone(), store)?;
        let app = build_router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
