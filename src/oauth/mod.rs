//! OAuth client entity abstractions shared with the authorization server.

pub mod types;

pub use types::{Client, ClientInfo};
