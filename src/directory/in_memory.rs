//! Local-cache-over-a-replicated-map directory implementation.
//!
//! Backed by a DashMap routing table: lock-free reads and writes without a
//! global mutex, scaling with actor count the way a sharded concurrent map
//! does. The "underlying replicated map" the trait docs refer to and the
//! local cache are modeled here as two DashMaps, since this crate
//! has no actual network replication layer (§1); in a clustered deployment
//! the underlying map would be swapped for a gossip-backed store without
//! changing this trait's contract.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

// Layer 3: Internal module imports
use super::{Directory, DirectoryChange, DirectorySubscription};
use crate::address::Address;

struct CacheEntry {
    location: String,
    expires_at: Instant,
}

/// A complete local directory: an underlying binding map plus a
/// TTL-expiring cache in front of it (§4.4).
pub struct InMemoryDirectory {
    bindings: DashMap<String, String>,
    cache: DashMap<String, CacheEntry>,
    cache_ttl: Duration,
    subscribers: Arc<RwLock<HashMap<u64, Box<dyn Fn(DirectoryChange) + Send + Sync>>>>,
    next_subscriber_id: AtomicU64,
}

impl InMemoryDirectory {
    pub fn new(cache_ttl: Duration) -> Self {
        Self {
            bindings: DashMap::new(),
            cache: DashMap::new(),
            cache_ttl,
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            next_subscriber_id: AtomicU64::new(0),
        }
    }

    fn notify(&self, change: DirectoryChange) {
        for listener in self.subscribers.read().values() {
            listener(change.clone());
        }
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn register(&self, address: &Address, location: &str) {
        let path = address.path();
        self.bindings.insert(path.clone(), location.to_string());
        self.cache.insert(
            path.clone(),
            CacheEntry {
                location: location.to_string(),
                expires_at: Instant::now() + self.cache_ttl,
            },
        );
        self.notify(DirectoryChange::Registered {
            path,
            location: location.to_string(),
        });
    }

    async fn unregister(&self, address: &Address) {
        let path = address.path();
        self.bindings.remove(&path);
        self.cache.remove(&path);
        self.notify(DirectoryChange::Unregistered { path });
    }

    async fn lookup(&self, address: &Address) -> Option<String> {
        let path = address.path();

        if let Some(entry) = self.cache.get(&path) {
            if entry.expires_at > Instant::now() {
                return Some(entry.location.clone());
            }
        }

        let location = self.bindings.get(&path).map(|v| v.clone());
        if let Some(location) = &location {
            self.cache.insert(
                path,
                CacheEntry {
                    location: location.clone(),
                    expires_at: Instant::now() + self.cache_ttl,
                },
            );
        }
        location
    }

    async fn list_by_type(&self, kind: &str) -> HashMap<String, String> {
        let needle = format!("/{kind}/");
        self.bindings
            .iter()
            .filter(|entry| entry.key().contains(&needle))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    async fn get_all(&self) -> HashMap<String, String> {
        self.bindings
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    async fn cleanup(&self) {
        self.cache.clear();
    }

    fn subscribe_to_changes(
        &self,
        listener: Box<dyn Fn(DirectoryChange) + Send + Sync>,
    ) -> DirectorySubscription {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().insert(id, listener);

        let subscribers = Arc::clone(&self.subscribers);
        DirectorySubscription::new(move || {
            subscribers.write().remove(&id);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn addr() -> Address {
        Address::new("local", "worker", "1")
    }

    #[tokio::test]
    async fn register_then_lookup_returns_location() {
        let dir = InMemoryDirectory::new(Duration::from_secs(60));
        dir.register(&addr(), "local").await;
        assert_eq!(dir.lookup(&addr()).await, Some("local".to_string()));
    }

    #[tokio::test]
    async fn unregister_removes_binding() {
        let dir = InMemoryDirectory::new(Duration::from_secs(60));
        dir.register(&addr(), "local").await;
        dir.unregister(&addr()).await;
        assert_eq!(dir.lookup(&addr()).await, None);
    }

    #[tokio::test]
    async fn lookup_unknown_returns_none() {
        let dir = InMemoryDirectory::new(Duration::from_secs(60));
        assert_eq!(dir.lookup(&addr()).await, None);
    }

    #[tokio::test]
    async fn cache_expiry_falls_back_to_underlying_map() {
        let dir = InMemoryDirectory::new(Duration::from_millis(1));
        dir.register(&addr(), "local").await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        // cache entry is stale, but the underlying binding is still present
        assert_eq!(dir.lookup(&addr()).await, Some("local".to_string()));
    }

    #[tokio::test]
    async fn cleanup_drops_cache_not_bindings() {
        let dir = InMemoryDirectory::new(Duration::from_secs(60));
        dir.register(&addr(), "local").await;
        dir.cleanup().await;
        assert_eq!(dir.lookup(&addr()).await, Some("local".to_string()));
    }

    #[tokio::test]
    async fn list_by_type_filters_correctly() {
        let dir = InMemoryDirectory::new(Duration::from_secs(60));
        dir.register(&Address::new("local", "worker", "1"), "local")
            .await;
        dir.register(&Address::new("local", "collector", "2"), "local")
            .await;
        let workers = dir.list_by_type("worker").await;
        assert_eq!(workers.len(), 1);
        assert!(workers.contains_key("actor://local/worker/1"));
    }

    #[tokio::test]
    async fn change_subscribers_are_notified() {
        let dir = InMemoryDirectory::new(Duration::from_secs(60));
        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = Arc::clone(&seen);
        let sub = dir.subscribe_to_changes(Box::new(move |_change| {
            seen2.fetch_add(1, Ordering::SeqCst);
        }));

        dir.register(&addr(), "local").await;
        dir.unregister(&addr()).await;
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        sub.unsubscribe();
        dir.register(&addr(), "local").await;
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
