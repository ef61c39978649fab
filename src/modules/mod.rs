pub mod comics;

use std::sync::Arc;

use longbox_kernel::{settings::Settings, ModuleRegistry};

use comics::repository::ComicRepository;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    repository: Arc<dyn ComicRepository>,
    settings: &Settings,
) -> anyhow::Result<()> {
    registry.register(comics::create_module(
        repository,
        settings.inventory.clone(),
    ))?;
    Ok(())
}
