//! The `report` commands: read-only summaries printed to stdout.

use anyhow::{Context, Result};
use mongodb::bson::doc;
use pantry_core::store::{ALL_COLLECTIONS, RECIPES};
use pantry_core::types::preferred_text;
use pantry_core::{Config, RecipeStore, Store};

/// Every category path in use, with recipe counts and the category document
/// that backs it (or a warning when none does).
pub async fn categories(config: &Config) -> Result<()> {
    let store = Store::connect(config)
        .await
        .context("Failed to connect to document store")?;

    let paths = store.distinct_category_paths().await?;
    if paths.is_empty() {
        println!("No recipes found.");
        return Ok(());
    }

    println!("Categories in use: {}", paths.len());
    for path in &paths {
        let count = store.count_by_category(path).await?;
        match store.find_category(path).await {
            Ok(Some(category)) => {
                let title = preferred_text(&category.title).unwrap_or(path);
                let status = if category.active { "active" } else { "inactive" };
                println!("  {}: {} recipes ({}, {})", path, count, title, status);
            }
            Ok(None) => {
                println!("  {}: {} recipes (NO CATEGORY DOCUMENT)", path, count);
            }
            Err(e) => {
                eprintln!("Warning: failed to read category {}: {}", path, e);
                println!("  {}: {} recipes (unreadable category document)", path, count);
            }
        }
    }

    Ok(())
}

/// Recipes still waiting for an image, capped at `limit` slugs.
pub async fn missing_images(config: &Config, limit: i64) -> Result<()> {
    let store = Store::connect(config)
        .await
        .context("Failed to connect to document store")?;

    let total = store
        .count(RECIPES, doc! { "image": { "$exists": false } })
        .await?;
    if total == 0 {
        println!("All recipes have images.");
        return Ok(());
    }

    let recipes = store.find_missing_images(limit).await?;
    println!("Recipes without an image: {}", total);
    for recipe in &recipes {
        let title = preferred_text(&recipe.title).unwrap_or(&recipe.slug);
        println!("  {} ({})", recipe.slug, title);
    }
    if total > recipes.len() as u64 {
        println!("  ... and {} more", total - recipes.len() as u64);
    }

    Ok(())
}

/// Document counts for every collection the site uses.
pub async fn overview(config: &Config) -> Result<()> {
    let store = Store::connect(config)
        .await
        .context("Failed to connect to document store")?;

    let mut total = 0;
    println!("Collection counts:");
    for name in ALL_COLLECTIONS {
        let count = store.count(name, doc! {}).await?;
        println!("  {}: {}", name, count);
        total += count;
    }
    println!("Total documents: {}", total);

    Ok(())
}
