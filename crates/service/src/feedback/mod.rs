//! Feedback: authenticated, append-only collection of satisfaction ratings.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;

pub use service::FeedbackService;
