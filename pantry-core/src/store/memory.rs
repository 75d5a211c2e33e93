//! In-memory recipe store for testing.
//!
//! Mirrors the production store's semantics (field-set patches, distinct as
//! a set, update-many counts) without a database, so pipeline and watcher
//! tests run hermetically.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::store::{RecipeStore, UpdateCounts};
use crate::types::{ImageRef, Recipe};

/// An in-memory [`RecipeStore`] keyed by slug.
#[derive(Debug, Default)]
pub struct MemoryRecipeStore {
    recipes: RwLock<HashMap<String, Recipe>>,
}

#[allow(dead_code)]
impl MemoryRecipeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipe, builder-style.
    pub fn with_recipe(self, recipe: Recipe) -> Self {
        self.recipes
            .write()
            .unwrap()
            .insert(recipe.slug.clone(), recipe);
        self
    }

    /// Snapshot one recipe for assertions.
    pub fn get(&self, slug: &str) -> Option<Recipe> {
        self.recipes.read().unwrap().get(slug).cloned()
    }

    /// Number of stored recipes.
    pub fn len(&self) -> usize {
        self.recipes.read().unwrap().len()
    }

    /// Whether the store holds no recipes.
    pub fn is_empty(&self) -> bool {
        self.recipes.read().unwrap().is_empty()
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Recipe>, StoreError> {
        Ok(self.recipes.read().unwrap().get(slug).cloned())
    }

    async fn insert(&self, recipe: &Recipe) -> Result<(), StoreError> {
        self.recipes
            .write()
            .unwrap()
            .insert(recipe.slug.clone(), recipe.clone());
        Ok(())
    }

    async fn set_image(&self, slug: &str, image: &ImageRef) -> Result<bool, StoreError> {
        let mut recipes = self.recipes.write().unwrap();
        match recipes.get_mut(slug) {
            Some(recipe) => {
                recipe.image = Some(image.clone());
                recipe.updated_at = Some(Utc::now().to_rfc3339());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool, StoreError> {
        Ok(self.recipes.write().unwrap().remove(slug).is_some())
    }

    async fn find_missing_images(&self, limit: i64) -> Result<Vec<Recipe>, StoreError> {
        let recipes = self.recipes.read().unwrap();
        let mut missing: Vec<Recipe> = recipes
            .values()
            .filter(|r| r.image.is_none())
            .cloned()
            .collect();
        missing.sort_by(|a, b| a.slug.cmp(&b.slug));
        missing.truncate(limit.max(0) as usize);
        Ok(missing)
    }

    async fn distinct_category_paths(&self) -> Result<Vec<String>, StoreError> {
        let recipes = self.recipes.read().unwrap();
        let paths: BTreeSet<String> = recipes
            .values()
            .map(|r| r.category_path.clone())
            .collect();
        Ok(paths.into_iter().collect())
    }

    async fn count_by_category(&self, path: &str) -> Result<u64, StoreError> {
        let recipes = self.recipes.read().unwrap();
        Ok(recipes.values().filter(|r| r.category_path == path).count() as u64)
    }

    async fn rename_category(&self, from: &str, to: &str) -> Result<UpdateCounts, StoreError> {
        let mut recipes = self.recipes.write().unwrap();
        let mut counts = UpdateCounts {
            matched: 0,
            modified: 0,
        };
        for recipe in recipes.values_mut() {
            if recipe.category_path == from {
                counts.matched += 1;
                if from != to {
                    recipe.category_path = to.to_string();
                    recipe.updated_at = Some(Utc::now().to_rfc3339());
                    counts.modified += 1;
                }
            }
        }
        Ok(counts)
    }
}
