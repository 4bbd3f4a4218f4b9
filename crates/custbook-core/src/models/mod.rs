//! Data models for customer records.
//!
//! - `Customer`: one record of the remote collection, also used as the create payload
//! - `Customers`: the collection in server response order

pub mod customer;

pub use customer::{Customer, Customers};
