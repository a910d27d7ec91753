pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::FormError;
pub use forms::{
    DeveloperProjectForm, FormKind, FormLayout, OtherDetailsForm, OwnerForm, PermissionForm,
    ProjectForm, PropertyBasicDetailsForm, PropertyForm,
};
pub use logic::{CleanedData, FormSchema, RawInput, Resolver, ValidationErrors};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

use std::sync::Arc;

use crate::config::{AppConfig, StorageBackend};

/// Open the configured store, define the permission catalog and serve the API
/// until the listener fails.
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    match config.database.backend {
        StorageBackend::Postgres => {
            log::info!("Connecting to PostgreSQL...");
            let database_url = config.database_url()?;
            let store = PostgresStore::new(&database_url, config.max_connections()).await?;

            log::info!("Running database migrations...");
            store.migrate().await?;

            serve(Arc::new(store), &config).await
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage; records are lost on exit");
            serve(Arc::new(MemoryStore::new()), &config).await
        }
    }
}

async fn serve<S: Store + 'static>(store: Arc<S>, config: &AppConfig) -> anyhow::Result<()> {
    let created = seed::load_permission_catalog(&*store, &config.permissions.catalog).await?;
    if created > 0 {
        log::info!("Permission catalog: {} new entries", created);
    }

    let app = routes::create_router().with_state(store);

    let bind_address = config.server_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log::info!("estate-forms listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
