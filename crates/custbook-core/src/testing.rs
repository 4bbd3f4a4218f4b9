//! In-memory stand-in for the customer service.
//!
//! Serves `GET` and `POST` on the collection path from a `Vec<Customer>`,
//! records every request, and can be told to fail reads, fail writes, or be
//! unreachable.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::api::{Method, Request, Response, Transport, TransportError, CUSTOMERS_KEY};
use crate::models::{Customer, Customers};

#[derive(Default)]
pub struct InMemoryServer {
    state: Mutex<ServerState>,
}

struct ServerState {
    customers: Customers,
    requests: Vec<Request>,
    read_failure: Option<Response>,
    write_failure: Option<Response>,
    reachable: bool,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            customers: Vec::new(),
            requests: Vec::new(),
            read_failure: None,
            write_failure: None,
            reachable: true,
        }
    }
}

impl InMemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(customers: Customers) -> Self {
        let server = Self::new();
        server.state().customers = customers;
        server
    }

    fn state(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer every read with `response` until cleared with `clear_failures`.
    pub fn fail_reads(&self, response: Response) {
        self.state().read_failure = Some(response);
    }

    /// Answer every write with `response` until cleared with `clear_failures`.
    pub fn fail_writes(&self, response: Response) {
        self.state().write_failure = Some(response);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.read_failure = None;
        state.write_failure = None;
    }

    /// When unreachable, every request fails at the transport level.
    pub fn set_reachable(&self, reachable: bool) {
        self.state().reachable = reachable;
    }

    /// Add a record as if another client had created it.
    pub fn insert(&self, customer: Customer) {
        self.state().customers.push(customer);
    }

    pub fn customers(&self) -> Customers {
        self.state().customers.clone()
    }

    /// Every request received, reachable or not, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.state().requests.clone()
    }

    pub fn reads(&self) -> usize {
        self.count(Method::Get)
    }

    pub fn writes(&self) -> usize {
        self.count(Method::Post)
    }

    fn count(&self, method: Method) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .count()
    }
}

fn json_response(status: u16, value: &serde_json::Value) -> Response {
    Response::new(status, value.to_string())
}

#[async_trait]
impl Transport for InMemoryServer {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let mut state = self.state();
        state.requests.push(request.clone());

        if !state.reachable {
            return Err(TransportError::Unavailable("connection refused".to_string()));
        }

        if request.path != CUSTOMERS_KEY {
            return Ok(json_response(
                404,
                &serde_json::json!({"code": "NotFound", "message": "Resource not found"}),
            ));
        }

        match request.method {
            Method::Get => {
                if let Some(ref failure) = state.read_failure {
                    return Ok(failure.clone());
                }
                let body = serde_json::to_value(&state.customers)
                    .unwrap_or(serde_json::Value::Null);
                Ok(json_response(200, &body))
            }
            Method::Post => {
                if let Some(ref failure) = state.write_failure {
                    return Ok(failure.clone());
                }
                let body = request.body.unwrap_or(serde_json::Value::Null);
                match serde_json::from_value::<Customer>(body) {
                    Ok(customer) => {
                        state.customers.push(customer);
                        Ok(json_response(201, &serde_json::json!({})))
                    }
                    Err(e) => Ok(json_response(
                        400,
                        &serde_json::json!({"code": "BadRequest", "message": e.to_string()}),
                    )),
                }
            }
        }
    }
}
