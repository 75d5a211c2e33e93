//! Document store accessor and the typed recipe boundary.
//!
//! [`Store`] wraps one database handle and exposes the raw collection
//! operations every admin tool is built from (single round trips, no
//! transactions, no retries). [`RecipeStore`] is the typed seam the ingestion
//! pipeline and reports go through; [`MemoryRecipeStore`](memory::MemoryRecipeStore)
//! implements it for tests.

mod memory;

pub use memory::MemoryRecipeStore;

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, from_document, to_bson, to_document, Bson, Document};
use mongodb::{Client, Database};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::StoreError;
use crate::types::{Category, ImageRef, Recipe};

/// Current recipe collection.
pub const RECIPES: &str = "recipes_new";

/// Legacy recipe collection, read-only (overview counts).
pub const RECIPES_LEGACY: &str = "recipes";

/// Category collection.
pub const CATEGORIES: &str = "categories_new";

/// Filter definition collection (simple keyed records).
pub const FILTER_DEFINITIONS: &str = "filter_definitions";

/// Page configuration collection (simple keyed records).
pub const PAGE_CONFIGS: &str = "page_configs";

/// Every collection the tools touch.
pub const ALL_COLLECTIONS: &[&str] = &[
    RECIPES_LEGACY,
    RECIPES,
    CATEGORIES,
    FILTER_DEFINITIONS,
    PAGE_CONFIGS,
];

/// Matched/modified counts from an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateCounts {
    pub matched: u64,
    pub modified: u64,
}

/// Typed operations over recipe documents.
///
/// The production implementation is [`Store`]; tests use
/// [`MemoryRecipeStore`].
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Fetch one recipe by slug. `Ok(None)` means no document matched.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Recipe>, StoreError>;

    /// Insert a new recipe document.
    async fn insert(&self, recipe: &Recipe) -> Result<(), StoreError>;

    /// Field-set patch of the image reference and the updated timestamp.
    /// Returns whether a document matched the slug.
    async fn set_image(&self, slug: &str, image: &ImageRef) -> Result<bool, StoreError>;

    /// Hard-delete one recipe by slug. Returns whether a document was removed.
    async fn delete_by_slug(&self, slug: &str) -> Result<bool, StoreError>;

    /// Recipes with no image reference, capped at `limit`.
    async fn find_missing_images(&self, limit: i64) -> Result<Vec<Recipe>, StoreError>;

    /// Distinct `categoryPath` values across all recipes.
    async fn distinct_category_paths(&self) -> Result<Vec<String>, StoreError>;

    /// Number of recipes under one category path.
    async fn count_by_category(&self, path: &str) -> Result<u64, StoreError>;

    /// Re-point every recipe under `from` to `to` (update-many).
    async fn rename_category(&self, from: &str, to: &str) -> Result<UpdateCounts, StoreError>;
}

/// Document store accessor: one connection, collection-scoped operations.
///
/// The underlying client is released when the value drops, so holding a
/// `Store` for the duration of a command gives scoped acquisition and
/// guaranteed release.
pub struct Store {
    db: Database,
}

impl Store {
    /// Connect and select the configured database.
    ///
    /// Pings the server so an unreachable or unauthorized deployment fails
    /// here, at startup, rather than on first use. Callers treat this error
    /// as fatal for the whole process.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(&config.mongo_uri)
            .await
            .map_err(StoreError::Connect)?;
        let db = client.database(&config.db_name);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(StoreError::Connect)?;
        tracing::debug!(db = %config.db_name, "connected to document store");
        Ok(Self { db })
    }

    fn coll(&self, name: &str) -> mongodb::Collection<Document> {
        self.db.collection::<Document>(name)
    }

    fn query_error(collection: &str, source: mongodb::error::Error) -> StoreError {
        StoreError::Query {
            collection: collection.to_string(),
            source,
        }
    }

    /// Find one document matching `filter`.
    pub async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        self.coll(collection)
            .find_one(filter)
            .await
            .map_err(|e| Self::query_error(collection, e))
    }

    /// Find all documents matching `filter`, optionally projected and limited.
    pub async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
        limit: Option<i64>,
    ) -> Result<Vec<Document>, StoreError> {
        let coll = self.coll(collection);
        let mut find = coll.find(filter);
        if let Some(projection) = projection {
            find = find.projection(projection);
        }
        if let Some(limit) = limit {
            find = find.limit(limit);
        }
        let cursor = find.await.map_err(|e| Self::query_error(collection, e))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| Self::query_error(collection, e))
    }

    /// Count documents matching `filter`.
    pub async fn count(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        self.coll(collection)
            .count_documents(filter)
            .await
            .map_err(|e| Self::query_error(collection, e))
    }

    /// Insert one document.
    pub async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.coll(collection)
            .insert_one(document)
            .await
            .map_err(|e| Self::query_error(collection, e))?;
        Ok(())
    }

    /// Field-set patch (`$set`) of the first document matching `filter`.
    pub async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<UpdateCounts, StoreError> {
        let result = self
            .coll(collection)
            .update_one(filter, doc! { "$set": set })
            .await
            .map_err(|e| Self::query_error(collection, e))?;
        Ok(UpdateCounts {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    /// Field-set patch (`$set`) of every document matching `filter`.
    pub async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<UpdateCounts, StoreError> {
        let result = self
            .coll(collection)
            .update_many(filter, doc! { "$set": set })
            .await
            .map_err(|e| Self::query_error(collection, e))?;
        Ok(UpdateCounts {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    /// Delete the first document matching `filter`. Returns whether a
    /// document was removed.
    pub async fn delete_one(&self, collection: &str, filter: Document) -> Result<bool, StoreError> {
        let result = self
            .coll(collection)
            .delete_one(filter)
            .await
            .map_err(|e| Self::query_error(collection, e))?;
        Ok(result.deleted_count > 0)
    }

    /// Distinct values of `field` across documents matching `filter`.
    pub async fn distinct(
        &self,
        collection: &str,
        field: &str,
        filter: Document,
    ) -> Result<Vec<Bson>, StoreError> {
        self.coll(collection)
            .distinct(field, filter)
            .await
            .map_err(|e| Self::query_error(collection, e))
    }

    /// Fetch one category by path.
    pub async fn find_category(&self, path: &str) -> Result<Option<Category>, StoreError> {
        let found = self.find_one(CATEGORIES, doc! { "path": path }).await?;
        found.map(|d| decode(CATEGORIES, path, d)).transpose()
    }

    /// Insert or replace the category with the same path. Returns whether a
    /// new document was created.
    pub async fn upsert_category(&self, category: &Category) -> Result<bool, StoreError> {
        let set = to_document(category).map_err(|e| StoreError::Encode {
            collection: CATEGORIES.to_string(),
            key: category.path.clone(),
            source: e,
        })?;
        let result = self
            .coll(CATEGORIES)
            .update_one(doc! { "path": &category.path }, doc! { "$set": set })
            .upsert(true)
            .await
            .map_err(|e| Self::query_error(CATEGORIES, e))?;
        Ok(result.upserted_id.is_some())
    }
}

/// Validate-on-read: turn a raw document into a typed value, rejecting
/// anything that does not fit the schema.
fn decode<T: DeserializeOwned>(
    collection: &str,
    key: &str,
    document: Document,
) -> Result<T, StoreError> {
    from_document(document).map_err(|e| StoreError::Malformed {
        collection: collection.to_string(),
        key: key.to_string(),
        source: e,
    })
}

#[async_trait]
impl RecipeStore for Store {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Recipe>, StoreError> {
        let found = self.find_one(RECIPES, doc! { "slug": slug }).await?;
        found.map(|d| decode(RECIPES, slug, d)).transpose()
    }

    async fn insert(&self, recipe: &Recipe) -> Result<(), StoreError> {
        let document = to_document(recipe).map_err(|e| StoreError::Encode {
            collection: RECIPES.to_string(),
            key: recipe.slug.clone(),
            source: e,
        })?;
        self.insert_one(RECIPES, document).await
    }

    async fn set_image(&self, slug: &str, image: &ImageRef) -> Result<bool, StoreError> {
        let image = to_bson(image).map_err(|e| StoreError::Encode {
            collection: RECIPES.to_string(),
            key: slug.to_string(),
            source: e,
        })?;
        let counts = self
            .update_one(
                RECIPES,
                doc! { "slug": slug },
                doc! { "image": image, "updatedAt": Utc::now().to_rfc3339() },
            )
            .await?;
        Ok(counts.matched > 0)
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool, StoreError> {
        self.delete_one(RECIPES, doc! { "slug": slug }).await
    }

    async fn find_missing_images(&self, limit: i64) -> Result<Vec<Recipe>, StoreError> {
        let projection = doc! { "slug": 1, "title": 1, "categoryPath": 1, "status": 1 };
        let documents = self
            .find_many(
                RECIPES,
                doc! { "image": doc! { "$exists": false } },
                Some(projection),
                Some(limit),
            )
            .await?;
        documents
            .into_iter()
            .map(|d| {
                let key = d.get_str("slug").unwrap_or("<missing slug>").to_string();
                decode(RECIPES, &key, d)
            })
            .collect()
    }

    async fn distinct_category_paths(&self) -> Result<Vec<String>, StoreError> {
        let values = self.distinct(RECIPES, "categoryPath", doc! {}).await?;
        Ok(values
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }

    async fn count_by_category(&self, path: &str) -> Result<u64, StoreError> {
        self.count(RECIPES, doc! { "categoryPath": path }).await
    }

    async fn rename_category(&self, from: &str, to: &str) -> Result<UpdateCounts, StoreError> {
        self.update_many(
            RECIPES,
            doc! { "categoryPath": from },
            doc! { "categoryPath": to, "updatedAt": Utc::now().to_rfc3339() },
        )
        .await
    }
}
