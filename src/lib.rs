//! OAuth2 client store library crate.
//!
//! Persists OAuth2 client registrations in a relational table and serves them back
//! by client id to an authorization server.

pub mod config;
pub mod errors;
pub mod oauth;
pub mod storage;
