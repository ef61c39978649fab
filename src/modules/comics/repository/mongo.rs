use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime, Document};
use futures::TryStreamExt;
use longbox_db::StorageResult;
use mongodb::{
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};

use super::ComicRepository;
use crate::modules::comics::{
    models::{ComicBook, ComicPatch, Condition, NewComic},
    query::{InventoryFilter, InventoryQuery, SortDirection},
};

/// Stored form of a comic book. Field names match the JSON representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComicDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    author: String,
    year_of_publication: i32,
    price: f64,
    #[serde(default)]
    discount: f64,
    number_of_pages: i64,
    condition: Condition,
    #[serde(default)]
    description: String,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<ComicDocument> for ComicBook {
    fn from(document: ComicDocument) -> Self {
        ComicBook {
            id: document.id.to_hex(),
            name: document.name,
            author: document.author,
            year_of_publication: document.year_of_publication,
            price: document.price,
            discount: document.discount,
            number_of_pages: document.number_of_pages,
            condition: document.condition,
            description: document.description,
            created_at: document.created_at.to_chrono(),
            updated_at: document.updated_at.to_chrono(),
        }
    }
}

/// Repository backed by a MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoComicRepository {
    collection: Collection<ComicDocument>,
}

impl MongoComicRepository {
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
        }
    }
}

/// Identifiers that are not ObjectIds cannot match any stored record.
fn parse_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

fn filter_document(filter: &InventoryFilter) -> Document {
    let mut document = Document::new();
    if let Some(author) = &filter.author {
        document.insert("author", author.as_str());
    }
    if let Some(year) = filter.year_of_publication {
        document.insert("yearOfPublication", year);
    }
    if let Some(max_price) = filter.max_price {
        document.insert("price", doc! { "$lte": max_price });
    }
    if let Some(condition) = filter.condition {
        document.insert("condition", condition.as_str());
    }
    document
}

fn sort_document(query: &InventoryQuery) -> Document {
    let direction = match query.direction {
        SortDirection::Asc => 1,
        SortDirection::Desc => -1,
    };
    // `_id` breaks ties so consecutive pages do not overlap.
    doc! {
        query.sort_field.as_str(): direction,
        "_id": direction,
    }
}

fn find_options(query: &InventoryQuery) -> FindOptions {
    let mut options = FindOptions::default();
    options.sort = Some(sort_document(query));
    options.skip = Some(query.pagination.offset());
    options.limit = Some(i64::try_from(query.pagination.limit()).unwrap_or(i64::MAX));
    options
}

fn set_document(patch: ComicPatch, now: DateTime) -> Document {
    let mut set = Document::new();
    if let Some(name) = patch.name {
        set.insert("name", name);
    }
    if let Some(author) = patch.author {
        set.insert("author", author);
    }
    if let Some(year) = patch.year_of_publication {
        set.insert("yearOfPublication", year);
    }
    if let Some(price) = patch.price {
        set.insert("price", price);
    }
    if let Some(discount) = patch.discount {
        set.insert("discount", discount);
    }
    if let Some(pages) = patch.number_of_pages {
        set.insert("numberOfPages", pages);
    }
    if let Some(condition) = patch.condition {
        set.insert("condition", condition.as_str());
    }
    if let Some(description) = patch.description {
        set.insert("description", description);
    }
    set.insert("updatedAt", now);
    set
}

#[async_trait]
impl ComicRepository for MongoComicRepository {
    async fn create(&self, comic: NewComic) -> StorageResult<ComicBook> {
        let now = DateTime::now();
        let document = ComicDocument {
            id: ObjectId::new(),
            name: comic.name,
            author: comic.author,
            year_of_publication: comic.year_of_publication,
            price: comic.price,
            discount: comic.discount,
            number_of_pages: comic.number_of_pages,
            condition: comic.condition,
            description: comic.description,
            created_at: now,
            updated_at: now,
        };

        self.collection.insert_one(&document).await?;
        Ok(document.into())
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<ComicBook>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };

        Ok(self
            .collection
            .find_one(doc! { "_id": id })
            .await?
            .map(ComicBook::from))
    }

    async fn update(&self, id: &str, patch: ComicPatch) -> StorageResult<Option<ComicBook>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Ok(self
            .collection
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": set_document(patch, DateTime::now()) },
            )
            .with_options(options)
            .await?
            .map(ComicBook::from))
    }

    async fn delete(&self, id: &str) -> StorageResult<Option<ComicBook>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };

        Ok(self
            .collection
            .find_one_and_delete(doc! { "_id": id })
            .await?
            .map(ComicBook::from))
    }

    async fn find(&self, query: &InventoryQuery) -> StorageResult<Vec<ComicBook>> {
        Ok(self
            .collection
            .find(filter_document(&query.filter))
            .with_options(find_options(query))
            .await?
            .try_collect::<Vec<ComicDocument>>()
            .await?
            .into_iter()
            .map(ComicBook::from)
            .collect())
    }

    async fn count(&self, filter: &InventoryFilter) -> StorageResult<u64> {
        Ok(self
            .collection
            .count_documents(filter_document(filter))
            .await?)
    }

    async fn ensure_indexes(&self) -> StorageResult<()> {
        let indexes = ["name", "author", "yearOfPublication", "price", "condition"]
            .into_iter()
            .map(|field| IndexModel::builder().keys(doc! { field: 1 }).build());

        self.collection.create_indexes(indexes).await?;
        tracing::info!(
            collection = %self.collection.name(),
            "inventory indexes ensured"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::comics::query::InventoryParams;
    use longbox_kernel::settings::InventorySettings;

    #[test]
    fn empty_filter_is_an_open_query() {
        assert!(filter_document(&InventoryFilter::default()).is_empty());
    }

    #[test]
    fn filter_uses_exact_matches_and_price_ceiling() {
        let filter = InventoryFilter {
            author: Some("Jeff Smith".to_string()),
            year_of_publication: Some(1991),
            max_price: Some(20.0),
            condition: Some(Condition::New),
        };

        assert_eq!(
            filter_document(&filter),
            doc! {
                "author": "Jeff Smith",
                "yearOfPublication": 1991,
                "price": { "$lte": 20.0 },
                "condition": "new",
            }
        );
    }

    #[test]
    fn sort_breaks_ties_on_id_in_the_same_direction() {
        let params = InventoryParams {
            sort_by: Some("price".to_string()),
            order: Some("desc".to_string()),
            ..InventoryParams::default()
        };
        let query = InventoryQuery::from_params(&params, &InventorySettings::default()).unwrap();

        assert_eq!(sort_document(&query), doc! { "price": -1, "_id": -1 });
    }

    #[test]
    fn find_options_for_huge_pages_still_serialize() {
        let params = InventoryParams {
            page: Some(i64::MAX.to_string()),
            limit: Some("100".to_string()),
            ..InventoryParams::default()
        };
        let query = InventoryQuery::from_params(&params, &InventorySettings::default()).unwrap();

        let options = bson::serialize_to_document(&find_options(&query)).unwrap();
        assert_eq!(options.get_i64("skip").unwrap(), i64::MAX);
        assert_eq!(options.get_i64("limit").unwrap(), 100);
    }

    #[test]
    fn set_document_contains_only_supplied_fields() {
        let now = DateTime::now();
        let set = set_document(
            ComicPatch {
                price: Some(12.5),
                description: Some(String::new()),
                ..ComicPatch::default()
            },
            now,
        );

        assert_eq!(
            set,
            doc! { "price": 12.5, "description": "", "updatedAt": now }
        );
    }

    #[test]
    fn malformed_ids_never_reach_the_store() {
        assert!(parse_id("not-an-object-id").is_none());
        assert!(parse_id("64b7f0c2a1b2c3d4e5f60718").is_some());
    }
}
