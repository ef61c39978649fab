//! Startup and shutdown sequence for the service.

use std::sync::Arc;

use anyhow::Context;
use longbox_kernel::{
    settings::{DatabaseSettings, Settings, StorageBackend},
    InitCtx, ModuleRegistry,
};

use crate::modules::{
    self,
    comics::repository::{ComicRepository, InMemoryComicRepository, MongoComicRepository},
};

/// Open the storage backend selected in the settings.
pub async fn build_repository(
    settings: &DatabaseSettings,
) -> anyhow::Result<Arc<dyn ComicRepository>> {
    match settings.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; records are lost on shutdown");
            Ok(Arc::new(InMemoryComicRepository::new()))
        }
        StorageBackend::Mongodb => {
            let database = longbox_db::connect(settings)
                .await
                .with_context(|| format!("failed to connect to database '{}'", settings.name))?;
            tracing::info!(
                database = %settings.name,
                collection = %settings.collection,
                "connected to MongoDB"
            );
            Ok(Arc::new(MongoComicRepository::new(
                &database,
                &settings.collection,
            )))
        }
    }
}

/// Build a registry holding every application module.
pub fn build_registry(
    repository: Arc<dyn ComicRepository>,
    settings: &Settings,
) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, repository, settings)?;
    Ok(registry)
}

/// Connect storage, bring modules up, serve HTTP until a shutdown signal and
/// then stop modules in reverse order.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        port = settings.server.port,
        "longbox bootstrap starting"
    );

    let repository = build_repository(&settings.database).await?;
    let registry = build_registry(repository, &settings)?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;
    tracing::info!(modules = registry.module_count(), "longbox bootstrap complete");

    let served = longbox_http::start_server(&registry, &settings).await;

    registry.stop_modules().await?;
    served
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_needs_no_server() {
        let settings = DatabaseSettings {
            backend: StorageBackend::Memory,
            ..DatabaseSettings::default()
        };

        let repository = build_repository(&settings).await.unwrap();
        let registry = build_registry(repository, &Settings::default()).unwrap();

        assert_eq!(registry.module_count(), 1);
        assert!(registry.get_module("book").is_some());
    }
}
