//! Service layer for the student portal backend.
//! - Keeps registration, verification, login and feedback rules independent of the web framework.
//! - Stores are reached through traits so each caller can inject its own instance.
//! - Errors are typed per domain and mapped to HTTP by the server crate.

pub mod auth;
pub mod feedback;
pub mod token;
