//! Auth module: domain types, credential store, OTP issuing and the service that drives
//! the `Unregistered -> PendingVerification -> Verified` lifecycle of a student account.

pub mod domain;
pub mod errors;
pub mod otp;
pub mod password;
pub mod repository;
pub mod service;

pub use service::{AuthConfig, AuthService};
