use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use longbox_db::StorageResult;
use tokio::sync::RwLock;

use super::ComicRepository;
use crate::modules::comics::{
    models::{ComicBook, ComicPatch, NewComic},
    query::{InventoryFilter, InventoryQuery},
};

/// Process-local repository keeping records in a map.
///
/// Clones share the same records. Every query scans the whole map, which is
/// fine for development and tests but not for large inventories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryComicRepository {
    comics: Arc<RwLock<HashMap<String, ComicBook>>>,
}

impl InMemoryComicRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ComicRepository for InMemoryComicRepository {
    async fn create(&self, comic: NewComic) -> StorageResult<ComicBook> {
        // Same identifier format as the MongoDB backend.
        let comic = comic.into_comic(ObjectId::new().to_hex(), Utc::now());
        self.comics
            .write()
            .await
            .insert(comic.id.clone(), comic.clone());
        Ok(comic)
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<ComicBook>> {
        Ok(self.comics.read().await.get(id).cloned())
    }

    async fn update(&self, id: &str, patch: ComicPatch) -> StorageResult<Option<ComicBook>> {
        let mut comics = self.comics.write().await;
        let Some(comic) = comics.get_mut(id) else {
            return Ok(None);
        };
        patch.apply(comic, Utc::now());
        Ok(Some(comic.clone()))
    }

    async fn delete(&self, id: &str) -> StorageResult<Option<ComicBook>> {
        Ok(self.comics.write().await.remove(id))
    }

    async fn find(&self, query: &InventoryQuery) -> StorageResult<Vec<ComicBook>> {
        let comics = self.comics.read().await;
        let mut matching: Vec<&ComicBook> = comics
            .values()
            .filter(|comic| query.filter.matches(comic))
            .collect();
        matching.sort_by(|a, b| query.compare(a, b));

        let offset = usize::try_from(query.pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.pagination.limit()).unwrap_or(usize::MAX);

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &InventoryFilter) -> StorageResult<u64> {
        let comics = self.comics.read().await;
        Ok(comics.values().filter(|comic| filter.matches(comic)).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::comics::{
        models::Condition,
        query::{InventoryParams, SortDirection, SortField},
    };
    use longbox_kernel::settings::InventorySettings;

    fn new_comic(name: &str, author: &str, price: f64, condition: Condition) -> NewComic {
        NewComic {
            name: name.to_string(),
            author: author.to_string(),
            year_of_publication: 2001,
            price,
            discount: 0.0,
            number_of_pages: 48,
            condition,
            description: String::new(),
        }
    }

    fn query(params: InventoryParams) -> InventoryQuery {
        InventoryQuery::from_params(&params, &InventorySettings::default()).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_unique_object_ids() {
        let repository = InMemoryComicRepository::new();
        let first = repository
            .create(new_comic("A", "Ann", 5.0, Condition::New))
            .await
            .unwrap();
        let second = repository
            .create(new_comic("A", "Ann", 5.0, Condition::New))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert!(ObjectId::parse_str(&first.id).is_ok());
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn update_and_delete_miss_unknown_ids() {
        let repository = InMemoryComicRepository::new();
        let patch = ComicPatch {
            price: Some(3.0),
            ..ComicPatch::default()
        };

        assert!(repository.update("nope", patch).await.unwrap().is_none());
        assert!(repository.delete("nope").await.unwrap().is_none());
        assert_eq!(repository.count(&InventoryFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn find_filters_sorts_and_pages() {
        let repository = InMemoryComicRepository::new();
        for (name, price, condition) in [
            ("Daredevil", 4.0, Condition::Used),
            ("Akira", 30.0, Condition::New),
            ("Bone", 12.0, Condition::New),
            ("Concrete", 20.0, Condition::Used),
        ] {
            repository
                .create(new_comic(name, "Various", price, condition))
                .await
                .unwrap();
        }

        let cheap = query(InventoryParams {
            price: Some("20".to_string()),
            ..InventoryParams::default()
        });
        let names: Vec<String> = repository
            .find(&cheap)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Bone", "Concrete", "Daredevil"]);
        assert_eq!(repository.count(&cheap.filter).await.unwrap(), 3);

        let mut by_price_desc = query(InventoryParams {
            limit: Some("2".to_string()),
            page: Some("2".to_string()),
            ..InventoryParams::default()
        });
        by_price_desc.sort_field = SortField::Price;
        by_price_desc.direction = SortDirection::Desc;
        let prices: Vec<f64> = repository
            .find(&by_price_desc)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.price)
            .collect();
        assert_eq!(prices, vec![12.0, 4.0]);
    }
}
