//! The request/response seam between the protocol logic and the network.
//!
//! `ApiClient` speaks in terms of `Request` and `Response`; anything that can
//! carry them (the reqwest-backed `HttpTransport`, or an in-memory double in
//! tests) implements `Transport`.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Resource path, e.g. `/api/customers`
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl Request {
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::Get,
            path: path.to_string(),
            body: None,
        }
    }

    pub fn post<B: Serialize>(path: &str, body: &B) -> Result<Self, serde_json::Error> {
        Ok(Self {
            method: Method::Post,
            path: path.to_string(),
            body: Some(serde_json::to_value(body)?),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Carry one request to the remote side and return whatever it answered.
    ///
    /// Non-success statuses are returned as responses; only failures to obtain
    /// a response at all are errors.
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}
