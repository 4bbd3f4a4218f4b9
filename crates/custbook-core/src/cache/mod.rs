//! In-memory cache of remote resources.
//!
//! This module provides the `RemoteCache`, which owns the fetch, publish and
//! revalidate lifecycle for resources identified by a key (their path).
//! Consumers either subscribe to `CacheSnapshot` updates through a watch
//! channel or pull the latest snapshot on demand.
//!
//! Nothing is persisted; all state lives as long as the cache handle.

pub mod remote;
pub mod snapshot;

pub use remote::{Fetcher, RemoteCache, Revalidate};
pub use snapshot::CacheSnapshot;
