//! API client for the customer collection.
//!
//! `ApiClient` owns the read/create protocol: status checks, success-body
//! decoding and error-payload normalization. The network itself sits behind
//! the `Transport` trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::transport::{Request, Transport};
use super::ApiError;
use crate::cache::Fetcher;
use crate::models::{Customer, Customers};

/// Path of the customer collection resource. Also its cache key.
pub const CUSTOMERS_KEY: &str = "/api/customers";

/// Shown when a failed read carries no usable message.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load customers";

/// Shown when a failed create carries no usable message.
pub const CREATE_FAILED_MESSAGE: &str = "Failed to add customer";

/// Clone is cheap - the transport is shared behind an Arc.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Read a JSON resource.
    ///
    /// Success bodies decode as `T`; anything else becomes an `ApiError`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let response = self
            .transport
            .send(Request::get(path))
            .await
            .map_err(|e| ApiError::transport(&e))?;

        if !response.is_success() {
            let error = ApiError::from_status(response.status, &response.body, LOAD_FAILED_MESSAGE);
            warn!(path, status = response.status, code = %error.code, "Read failed");
            return Err(error);
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            warn!(path, error = %e, "Failed to parse JSON response");
            ApiError::malformed()
        })
    }

    /// Send a JSON body with POST. Any 2xx is success; the body is ignored.
    pub async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let request = Request::post(path, body).map_err(|e| {
            warn!(path, error = %e, "Failed to encode request body");
            ApiError::malformed()
        })?;

        debug!(path, "POST");
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ApiError::transport(&e))?;

        if !response.is_success() {
            let error =
                ApiError::from_status(response.status, &response.body, CREATE_FAILED_MESSAGE);
            warn!(path, status = response.status, code = %error.code, "Write failed");
            return Err(error);
        }

        Ok(())
    }

    // ===== Customer collection =====

    pub async fn fetch_customers(&self) -> Result<Customers, ApiError> {
        self.get_json(CUSTOMERS_KEY).await
    }

    pub async fn create_customer(&self, customer: &Customer) -> Result<(), ApiError> {
        self.post_json(CUSTOMERS_KEY, customer).await?;
        info!(email = %customer.email, "Customer created");
        Ok(())
    }
}

#[async_trait]
impl<T> Fetcher<T> for ApiClient
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, key: &str) -> Result<T, ApiError> {
        self.get_json(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::{Method, Response};
    use crate::api::{INVALID_RESPONSE, NETWORK_ERROR};
    use crate::testing::InMemoryServer;

    fn client_for(server: &Arc<InMemoryServer>) -> ApiClient {
        ApiClient::new(server.clone())
    }

    fn customer(first: &str, last: &str, email: &str) -> Customer {
        Customer {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            business_name: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_customers_in_server_order() {
        let server = Arc::new(InMemoryServer::with_customers(vec![
            customer("Zed", "Last", "z@x.com"),
            customer("Amy", "First", "a@x.com"),
        ]));

        let customers = client_for(&server).fetch_customers().await.unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].email, "z@x.com");
        assert_eq!(customers[1].email, "a@x.com");
    }

    #[tokio::test]
    async fn test_fetch_failure_parses_error_payload() {
        let server = Arc::new(InMemoryServer::new());
        server.fail_reads(Response::new(
            500,
            r#"{"code": "InternalError", "message": "Database offline"}"#,
        ));

        let error = client_for(&server).fetch_customers().await.unwrap_err();
        assert_eq!(error, ApiError::new("InternalError", "Database offline"));
    }

    #[tokio::test]
    async fn test_fetch_malformed_success_body() {
        let server = Arc::new(InMemoryServer::new());
        server.fail_reads(Response::new(200, "not json"));

        let error = client_for(&server).fetch_customers().await.unwrap_err();
        assert_eq!(error.code, INVALID_RESPONSE);
    }

    #[tokio::test]
    async fn test_fetch_unreachable() {
        let server = Arc::new(InMemoryServer::new());
        server.set_reachable(false);

        let error = client_for(&server).fetch_customers().await.unwrap_err();
        assert_eq!(error.code, NETWORK_ERROR);
    }

    #[tokio::test]
    async fn test_create_posts_payload() {
        let server = Arc::new(InMemoryServer::new());
        let new = customer("A", "B", "a@b.com");

        client_for(&server).create_customer(&new).await.unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].path, CUSTOMERS_KEY);
        assert_eq!(
            requests[0].body,
            Some(serde_json::json!({"firstName": "A", "lastName": "B", "email": "a@b.com"}))
        );
        assert_eq!(server.customers(), vec![new]);
    }

    #[tokio::test]
    async fn test_create_failure_without_message_uses_fallback() {
        let server = Arc::new(InMemoryServer::new());
        server.fail_writes(Response::new(400, "{}"));

        let error = client_for(&server)
            .create_customer(&customer("A", "B", "a@b.com"))
            .await
            .unwrap_err();
        assert_eq!(error.code, "http_400");
        assert_eq!(error.message, CREATE_FAILED_MESSAGE);
    }
}
