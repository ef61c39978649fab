//! Storage seam for comic books.

mod memory;
mod mongo;

pub use memory::InMemoryComicRepository;
pub use mongo::MongoComicRepository;

use async_trait::async_trait;
use longbox_db::StorageResult;

use super::models::{ComicBook, ComicPatch, NewComic};
use super::query::{InventoryFilter, InventoryQuery};

/// Persistence operations the handlers rely on.
///
/// Lookups by an identifier that cannot exist (including malformed ones)
/// return `Ok(None)` rather than an error.
#[async_trait]
pub trait ComicRepository: Send + Sync {
    /// Insert a record, assigning its identifier and timestamps.
    async fn create(&self, comic: NewComic) -> StorageResult<ComicBook>;

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<ComicBook>>;

    /// Apply `patch` and return the record as it is after the update.
    async fn update(&self, id: &str, patch: ComicPatch) -> StorageResult<Option<ComicBook>>;

    /// Remove a record, returning it if it existed.
    async fn delete(&self, id: &str) -> StorageResult<Option<ComicBook>>;

    /// One sorted page of the records matching the query filter.
    async fn find(&self, query: &InventoryQuery) -> StorageResult<Vec<ComicBook>>;

    /// Number of records matching `filter`, ignoring pagination.
    async fn count(&self, filter: &InventoryFilter) -> StorageResult<u64>;

    /// Create secondary indexes used by listing. Safe to call repeatedly.
    async fn ensure_indexes(&self) -> StorageResult<()> {
        Ok(())
    }
}
