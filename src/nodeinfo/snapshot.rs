/// Cache snapshots persisted across restarts
///
/// A snapshot is a JSON object mapping each domain to its software. Observation
/// times are not written, so every loaded entry starts out unobserved.
use crate::{
    error::{FedinfoError, FedinfoResult},
    nodeinfo::{Software, SoftwareCache},
};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Seed `cache` from the snapshot at `path`, returning how many entries were loaded
pub async fn load(cache: &SoftwareCache, path: &Path) -> FedinfoResult<usize> {
    let raw = tokio::fs::read(path).await?;
    let data: HashMap<String, Software> = serde_json::from_slice(&raw).map_err(|e| {
        FedinfoError::Internal(format!("Invalid cache snapshot {:?}: {}", path, e))
    })?;

    let count = data.len();
    cache.seed(data).await;
    info!("loaded {} cached domains from {:?}", count, path);

    Ok(count)
}

/// Write every cache entry to `path`, replacing its contents
pub async fn save(cache: &SoftwareCache, path: &Path) -> FedinfoResult<usize> {
    let data = cache.snapshot().await;
    let encoded = serde_json::to_vec(&data)
        .map_err(|e| FedinfoError::Internal(format!("Failed to encode cache snapshot: {}", e)))?;

    tokio::fs::write(path, encoded).await?;
    info!("wrote {} cached domains to {:?}", data.len(), path);

    Ok(data.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn create_test_cache() -> SoftwareCache {
        SoftwareCache::new(Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let cache = create_test_cache();
        cache.set("example.social", Software::new("mastodon", "4.2.0")).await;
        cache.set("misskey.example", Software::new("misskey", "2024.1.0")).await;
        assert_eq!(save(&cache, &path).await.unwrap(), 2);

        let restored = create_test_cache();
        assert_eq!(load(&restored, &path).await.unwrap(), 2);
        assert_eq!(
            restored.get("example.social").await,
            Some(Software::new("mastodon", "4.2.0"))
        );
    }

    #[tokio::test]
    async fn test_snapshot_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let cache = create_test_cache();
        cache.set("example.social", Software::new("mastodon", "4.2.0")).await;
        save(&cache, &path).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({
                "example.social": { "name": "mastodon", "version": "4.2.0" }
            })
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = create_test_cache();

        let result = load(&cache, &dir.path().join("absent.json")).await;
        assert!(matches!(result, Err(FedinfoError::Io(_))));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, b"{\"example.social\": [").unwrap();

        let cache = create_test_cache();
        assert!(matches!(
            load(&cache, &path).await,
            Err(FedinfoError::Internal(_))
        ));
        assert!(cache.is_empty().await);
    }
}
