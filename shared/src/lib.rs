//! Shared library for the availability calendar Lambda functions.
//!
//! This crate provides the availability domain logic plus the auth,
//! storage, and HTTP plumbing common to the API functions.

pub mod auth;
pub mod availability;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod store;

pub use auth::{caller_identity, decode_token, user_from_claims, AuthenticatedUser, Claims};
pub use availability::{
    get_current_user_unavailability, get_unavailability_for_month, toggle_unavailability,
};
pub use config::Config;
pub use error::{Error, Result};
pub use http::ApiResponse;
pub use models::{AvailabilityMarker, ToggleRequest, ToggleResponse, UnavailabilityEntry};
pub use store::AvailabilityStore;
