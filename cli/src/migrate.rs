//! The `migrate` commands: one-off data migrations with printed counts.

use anyhow::{Context, Result};
use mongodb::bson::doc;
use pantry_core::store::CATEGORIES;
use pantry_core::{Config, RecipeStore, Store};

/// Re-point every recipe under `from` to `to`, then move the category
/// document itself to the new path.
pub async fn rename_category(config: &Config, from: &str, to: &str) -> Result<()> {
    let store = Store::connect(config)
        .await
        .context("Failed to connect to document store")?;

    println!("Renaming category '{}' -> '{}'", from, to);

    let counts = store.rename_category(from, to).await?;
    println!(
        "  recipes: {} matched, {} modified",
        counts.matched, counts.modified
    );

    let category_counts = store
        .update_one(CATEGORIES, doc! { "path": from }, doc! { "path": to })
        .await?;
    if category_counts.matched > 0 {
        println!("  category document moved to '{}'", to);
    } else {
        println!("  no category document at '{}', recipes updated only", from);
    }

    println!();
    println!("{}", "=".repeat(50));
    println!("MIGRATION COMPLETE");
    println!("{}", "=".repeat(50));

    Ok(())
}
