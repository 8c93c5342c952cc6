/// Software Cache - in-memory TTL store of resolved software per domain
use crate::nodeinfo::Software;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A cached identity and the moment its freshness was last established
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Software,
    /// `None` for entries seeded from a snapshot that have not been read yet
    observed_at: Option<DateTime<Utc>>,
}

/// Software cache keyed by normalized domain
///
/// Every access goes through one exclusive lock over the whole map. The map
/// is unbounded and entries are never removed: a stale entry is only hidden
/// from `get` until the next `set` for its domain overwrites it.
///
/// Entries seeded from a snapshot carry no observation time. The first `get`
/// for such an entry stamps it with the current time and returns it as
/// fresh, so a restart does not throw away a warm snapshot. From then on it
/// expires like any other entry.
#[derive(Clone)]
pub struct SoftwareCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl SoftwareCache {
    /// Create an empty cache whose entries expire `ttl` after observation
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::from_std(ttl).unwrap_or(Duration::MAX),
        }
    }

    /// Get the cached software for a domain, if present and not stale
    pub async fn get(&self, domain: &str) -> Option<Software> {
        self.get_at(domain, Utc::now()).await
    }

    async fn get_at(&self, domain: &str, now: DateTime<Utc>) -> Option<Software> {
        let mut entries = self.entries.lock().await;
        let entry = entries.get_mut(domain)?;

        match entry.observed_at {
            Some(observed_at) => {
                if now - observed_at > self.ttl {
                    return None;
                }
                Some(entry.value.clone())
            }
            None => {
                entry.observed_at = Some(now);
                Some(entry.value.clone())
            }
        }
    }

    /// Cache software for a domain, replacing any previous entry
    pub async fn set(&self, domain: &str, software: Software) {
        self.set_at(domain, software, Utc::now()).await
    }

    async fn set_at(&self, domain: &str, software: Software, now: DateTime<Utc>) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            domain.to_string(),
            CacheEntry {
                value: software,
                observed_at: Some(now),
            },
        );
    }

    /// Bulk-load entries without an observation time
    pub async fn seed(&self, data: HashMap<String, Software>) {
        let mut entries = self.entries.lock().await;
        for (domain, value) in data {
            entries.insert(
                domain,
                CacheEntry {
                    value,
                    observed_at: None,
                },
            );
        }
    }

    /// Copy out every entry, stale ones included, for persistence
    pub async fn snapshot(&self) -> HashMap<String, Software> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .map(|(domain, entry)| (domain.clone(), entry.value.clone()))
            .collect()
    }

    /// Number of entries held, stale ones included
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL_SECS: u64 = 3600;

    fn create_test_cache() -> SoftwareCache {
        SoftwareCache::new(std::time::Duration::from_secs(TTL_SECS))
    }

    fn mastodon() -> Software {
        Software::new("mastodon", "4.2.0")
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = create_test_cache();

        cache.set("example.social", mastodon()).await;

        assert_eq!(cache.get("example.social").await, Some(mastodon()));
    }

    #[tokio::test]
    async fn test_get_unknown_domain() {
        let cache = create_test_cache();
        assert_eq!(cache.get("example.social").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = create_test_cache();
        let t0 = Utc::now();
        let ttl = Duration::seconds(TTL_SECS as i64);
        let epsilon = Duration::milliseconds(1);

        cache.set_at("example.social", mastodon(), t0).await;

        assert_eq!(
            cache.get_at("example.social", t0 + ttl - epsilon).await,
            Some(mastodon())
        );
        // Exactly TTL old is still fresh
        assert_eq!(
            cache.get_at("example.social", t0 + ttl).await,
            Some(mastodon())
        );
        assert_eq!(cache.get_at("example.social", t0 + ttl + epsilon).await, None);

        // Hidden, not removed
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.snapshot().await.get("example.social"), Some(&mastodon()));
    }

    #[tokio::test]
    async fn test_stale_get_does_not_refresh() {
        let cache = create_test_cache();
        let t0 = Utc::now();
        let ttl = Duration::seconds(TTL_SECS as i64);

        cache.set_at("example.social", mastodon(), t0).await;

        let late = t0 + ttl + Duration::seconds(1);
        assert_eq!(cache.get_at("example.social", late).await, None);
        assert_eq!(cache.get_at("example.social", late).await, None);
    }

    #[tokio::test]
    async fn test_set_overwrites_stale_entry() {
        let cache = create_test_cache();
        let t0 = Utc::now();
        let later = t0 + Duration::seconds(TTL_SECS as i64 * 2);

        cache.set_at("example.social", mastodon(), t0).await;
        assert_eq!(cache.get_at("example.social", later).await, None);

        let upgraded = Software::new("mastodon", "4.3.0");
        cache.set_at("example.social", upgraded.clone(), later).await;
        assert_eq!(cache.get_at("example.social", later).await, Some(upgraded));
    }

    #[tokio::test]
    async fn test_seeded_entry_is_adopted_on_first_read() {
        let cache = create_test_cache();
        let ttl = Duration::seconds(TTL_SECS as i64);
        let epsilon = Duration::milliseconds(1);

        let mut data = HashMap::new();
        data.insert("example.social".to_string(), mastodon());
        cache.seed(data).await;

        // Fresh no matter how long ago the snapshot was taken
        let t1 = Utc::now() + Duration::days(30);
        assert_eq!(cache.get_at("example.social", t1).await, Some(mastodon()));

        // Expiry now runs from the first read
        assert_eq!(
            cache.get_at("example.social", t1 + ttl - epsilon).await,
            Some(mastodon())
        );
        assert_eq!(cache.get_at("example.social", t1 + ttl + epsilon).await, None);
    }

    #[tokio::test]
    async fn test_seed_does_not_stamp_unread_entries() {
        let cache = create_test_cache();

        let mut data = HashMap::new();
        data.insert("a.example".to_string(), mastodon());
        data.insert("b.example".to_string(), Software::new("misskey", "2024.1.0"));
        cache.seed(data).await;

        let t1 = Utc::now();
        let ttl = Duration::seconds(TTL_SECS as i64);
        assert!(cache.get_at("a.example", t1).await.is_some());

        // b.example was never read, so it is adopted at its own first read
        let t2 = t1 + ttl * 3;
        assert_eq!(cache.get_at("a.example", t2).await, None);
        assert_eq!(
            cache.get_at("b.example", t2).await,
            Some(Software::new("misskey", "2024.1.0"))
        );
    }

    #[tokio::test]
    async fn test_snapshot_contains_all_entries() {
        let cache = create_test_cache();
        cache.set("a.example", mastodon()).await;
        cache.set("b.example", Software::new("pleroma", "2.6.0")).await;

        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["b.example"], Software::new("pleroma", "2.6.0"));
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = create_test_cache();
        let other = cache.clone();

        other.set("example.social", mastodon()).await;
        assert_eq!(cache.get("example.social").await, Some(mastodon()));
    }
}
