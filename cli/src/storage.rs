//! The `storage` commands: list and bulk-delete stored objects.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Result};
use pantry_core::object_store::{list_all, ObjectStore};
use pantry_core::{Config, S3ObjectStore};

/// Print every object under `prefix`, one page at a time.
pub async fn list(config: &Config, prefix: &str) -> Result<()> {
    let objects = S3ObjectStore::connect(config).await;

    let mut count: u64 = 0;
    let mut bytes: i64 = 0;
    let mut continuation = None;
    loop {
        let page = objects.list_page(prefix, continuation).await?;
        for object in &page.objects {
            println!("  {:>12}  {}", object.size, object.key);
            count += 1;
            bytes += object.size;
        }
        continuation = page.next_token;
        if continuation.is_none() {
            break;
        }
    }

    if count == 0 {
        println!("No objects under '{}'", prefix);
    } else {
        println!("{} objects, {} bytes under '{}'", count, bytes, prefix);
    }

    Ok(())
}

/// Delete everything under `prefix`, after an abort window.
pub async fn cleanup(config: &Config, prefix: &str, delay_secs: u64) -> Result<()> {
    let objects = S3ObjectStore::connect(config).await;
    cleanup_with(&objects, prefix, delay_secs, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// The cleanup procedure over any object store.
///
/// The listing is drained and announced first; the actual deletes only start
/// once the delay counts down without `abort` firing. The window is a
/// best-effort guard, not a lock.
async fn cleanup_with(
    objects: &dyn ObjectStore,
    prefix: &str,
    delay_secs: u64,
    abort: impl Future<Output = ()>,
) -> Result<()> {
    if prefix.is_empty() {
        bail!("Refusing to delete with an empty prefix (this would empty the bucket)");
    }

    let targets = list_all(objects, prefix).await?;
    if targets.is_empty() {
        println!("No objects under '{}', nothing to delete", prefix);
        return Ok(());
    }

    println!(
        "Deleting {} objects under '{}' in {}s, ctrl-c to abort",
        targets.len(),
        prefix,
        delay_secs
    );
    if !confirm_window(delay_secs, abort).await {
        println!("Aborted, nothing deleted");
        return Ok(());
    }

    let mut deleted: u64 = 0;
    let mut failed: u64 = 0;
    for object in &targets {
        match objects.delete(&object.key).await {
            Ok(()) => {
                deleted += 1;
            }
            Err(e) => {
                eprintln!("Warning: failed to delete {}: {}", object.key, e);
                failed += 1;
            }
        }
    }

    println!();
    println!("{}", "=".repeat(50));
    println!("CLEANUP COMPLETE");
    println!("{}", "=".repeat(50));
    println!("Deleted: {}", deleted);
    println!("Failed:  {}", failed);
    println!("{}", "=".repeat(50));

    if failed > 0 {
        bail!("{} objects could not be deleted", failed);
    }
    Ok(())
}

/// Count the safety delay down one second at a time. Returns false if
/// `abort` fires before the window closes.
async fn confirm_window(delay_secs: u64, abort: impl Future<Output = ()>) -> bool {
    tokio::pin!(abort);
    let mut remaining = delay_secs;
    while remaining > 0 {
        print!("{}... ", remaining);
        let _ = std::io::stdout().flush();
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(1)) => {
                remaining -= 1;
            }
            _ = &mut abort => {
                println!();
                return false;
            }
        }
    }
    println!();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::MemoryObjectStore;

    #[tokio::test(start_paused = true)]
    async fn test_confirm_window_proceeds_after_delay() {
        assert!(confirm_window(5, std::future::pending()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_window_aborts_mid_countdown() {
        let proceed = confirm_window(5, async {
            tokio::time::sleep(Duration::from_millis(1500)).await;
        })
        .await;
        assert!(!proceed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_aborted_during_window_deletes_nothing() {
        let store = MemoryObjectStore::new()
            .with_object("img/saltibarsciai.jpg", vec![1])
            .with_object("img/cepelinai.jpg", vec![2])
            .with_object("misc/readme.txt", vec![3]);

        cleanup_with(&store, "img/", 5, async {
            tokio::time::sleep(Duration::from_secs(2)).await;
        })
        .await
        .unwrap();

        assert_eq!(store.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_deletes_only_under_prefix_after_window() {
        let store = MemoryObjectStore::new()
            .with_object("img/saltibarsciai.jpg", vec![1])
            .with_object("img/cepelinai.jpg", vec![2])
            .with_object("misc/readme.txt", vec![3]);

        cleanup_with(&store, "img/", 5, std::future::pending())
            .await
            .unwrap();

        assert_eq!(store.keys(), vec!["misc/readme.txt"]);
    }

    #[tokio::test]
    async fn test_cleanup_refuses_empty_prefix() {
        let store = MemoryObjectStore::new().with_object("img/tinginys.jpg", vec![1]);
        let err = cleanup_with(&store, "", 0, std::future::pending())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty prefix"));
        assert_eq!(store.len(), 1);
    }
}
