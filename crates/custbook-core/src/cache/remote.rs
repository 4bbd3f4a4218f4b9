use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::CacheSnapshot;
use crate::api::ApiError;

/// Produces the current value of a resource.
#[async_trait]
pub trait Fetcher<T>: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<T, ApiError>;
}

/// Re-fetch a resource and republish it to every subscriber.
#[async_trait]
pub trait Revalidate: Send + Sync {
    async fn revalidate(&self, key: &str);
}

type Entry<T> = Arc<watch::Sender<CacheSnapshot<T>>>;

/// Keyed cache of remote resources with fetch/revalidate lifecycle.
///
/// Every key has one shared entry; all subscribers see the same snapshots.
/// Clone is cheap and clones share entries.
pub struct RemoteCache<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    fetcher: Arc<dyn Fetcher<T>>,
    entries: Mutex<HashMap<String, Entry<T>>>,
}

impl<T> Clone for RemoteCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> RemoteCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(fetcher: Arc<dyn Fetcher<T>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Subscribe to snapshots for `key`.
    ///
    /// The first subscription for a key starts a fetch in the background, so
    /// the returned receiver already reports `is_loading()`. Later
    /// subscriptions share the existing entry without fetching.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe(&self, key: &str) -> watch::Receiver<CacheSnapshot<T>> {
        let (entry, created) = self.entry(key);
        let receiver = entry.subscribe();

        if created {
            debug!(key, "First subscription, fetching");
            self.spawn_fetch(key, PendingFetch::begin(entry));
        }

        receiver
    }

    /// Latest snapshot for `key` without subscribing or fetching.
    pub fn snapshot(&self, key: &str) -> CacheSnapshot<T> {
        self.existing(key)
            .map(|entry| entry.borrow().clone())
            .unwrap_or_default()
    }

    /// Re-fetch `key` and publish the result once it arrives.
    ///
    /// Concurrent calls are not de-duplicated; whichever response arrives last
    /// is the one left published.
    ///
    /// Dropping the returned future before it completes abandons the fetch;
    /// the entry stops counting it as in flight.
    pub async fn revalidate(&self, key: &str) {
        let (entry, _) = self.entry(key);
        let pending = PendingFetch::begin(entry);
        Self::run_fetch(Arc::clone(&self.inner.fetcher), key, pending).await;
    }

    /// Like `revalidate`, but runs in a spawned task.
    ///
    /// The entry reports `is_validating()` before this returns.
    pub fn revalidate_in_background(&self, key: &str) -> JoinHandle<()> {
        let (entry, _) = self.entry(key);
        self.spawn_fetch(key, PendingFetch::begin(entry))
    }

    fn spawn_fetch(&self, key: &str, pending: PendingFetch<T>) -> JoinHandle<()> {
        let fetcher = Arc::clone(&self.inner.fetcher);
        let key = key.to_string();
        tokio::spawn(async move {
            Self::run_fetch(fetcher, &key, pending).await;
        })
    }

    /// Perform one fetch and settle it into the entry in a single replace.
    async fn run_fetch(fetcher: Arc<dyn Fetcher<T>>, key: &str, pending: PendingFetch<T>) {
        let result = fetcher.fetch(key).await;
        match result {
            Ok(_) => info!(key, "Fetch settled"),
            Err(ref e) => warn!(key, code = %e.code, error = %e, "Fetch failed"),
        }
        pending.settle(result);
    }

    /// Look up or create the entry for `key`. The bool is true when created.
    fn entry(&self, key: &str) -> (Entry<T>, bool) {
        let mut entries = self
            .inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get(key) {
            return (Arc::clone(entry), false);
        }

        let (sender, _) = watch::channel(CacheSnapshot::default());
        let entry = Arc::new(sender);
        entries.insert(key.to_string(), Arc::clone(&entry));
        (entry, true)
    }

    fn existing(&self, key: &str) -> Option<Entry<T>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

/// One fetch counted as in flight on an entry.
///
/// Settling publishes the result. Dropping it unsettled (the owning future was
/// cancelled or its task aborted) releases the in-flight slot so the entry can
/// still settle.
struct PendingFetch<T> {
    entry: Entry<T>,
    settled: bool,
}

impl<T> PendingFetch<T> {
    fn begin(entry: Entry<T>) -> Self {
        entry.send_modify(CacheSnapshot::begin_fetch);
        Self {
            entry,
            settled: false,
        }
    }

    fn settle(mut self, result: Result<T, ApiError>) {
        self.entry.send_modify(|snapshot| snapshot.settle(result));
        self.settled = true;
    }
}

impl<T> Drop for PendingFetch<T> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("Fetch dropped before settling");
            self.entry.send_modify(CacheSnapshot::abandon_fetch);
        }
    }
}

#[async_trait]
impl<T> Revalidate for RemoteCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn revalidate(&self, key: &str) {
        RemoteCache::revalidate(self, key).await
    }
}
