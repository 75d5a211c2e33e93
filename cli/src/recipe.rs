//! The `recipe` commands: inspect or remove a single recipe.

use anyhow::{Context, Result};
use pantry_core::{Config, RecipeStore, Store};

/// Print one recipe as pretty JSON. A missing slug is not an error.
pub async fn get(config: &Config, slug: &str) -> Result<()> {
    let store = Store::connect(config)
        .await
        .context("Failed to connect to document store")?;

    match store.find_by_slug(slug).await? {
        Some(recipe) => {
            let json = serde_json::to_string_pretty(&recipe)
                .with_context(|| format!("Failed to render recipe: {}", slug))?;
            println!("{}", json);
        }
        None => {
            println!("No recipe found for slug '{}'", slug);
        }
    }

    Ok(())
}

/// Delete one recipe. Reports whether a document was actually removed.
pub async fn delete(config: &Config, slug: &str) -> Result<()> {
    let store = Store::connect(config)
        .await
        .context("Failed to connect to document store")?;

    if store.delete_by_slug(slug).await? {
        println!("Deleted recipe '{}'", slug);
    } else {
        println!("No recipe found for slug '{}', nothing deleted", slug);
    }

    Ok(())
}
