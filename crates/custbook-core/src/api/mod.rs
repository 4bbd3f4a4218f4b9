//! REST API client module for the customer service.
//!
//! This module provides the `ApiClient` for reading the customer collection
//! and creating new customers, the `Transport` seam it sends requests
//! through, and the reqwest-backed `HttpTransport`.
//!
//! Every failure is normalized to an `ApiError` payload so callers can
//! surface it as state.

pub mod client;
pub mod error;
pub mod http;
pub mod transport;

pub use client::{ApiClient, CREATE_FAILED_MESSAGE, CUSTOMERS_KEY, LOAD_FAILED_MESSAGE};
pub use error::{ApiError, INVALID_RESPONSE, NETWORK_ERROR, UNREACHABLE_MESSAGE};
pub use http::{HttpTransport, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use transport::{Method, Request, Response, Transport, TransportError};
