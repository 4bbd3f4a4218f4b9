//! Core library for custbook.
//!
//! Keeps a local view of a remote customer collection in sync and mediates
//! the creation of new customers:
//!
//! - `api`: the read/create protocol and the HTTP transport
//! - `cache`: keyed fetch/revalidate cache publishing snapshots to subscribers
//! - `submission`: the validated add-customer workflow
//! - `models`: customer records

pub mod api;
pub mod cache;
pub mod models;
pub mod submission;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
