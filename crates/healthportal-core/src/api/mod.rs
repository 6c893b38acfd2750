//! REST API client module for the portal backend.
//!
//! This module provides the `ApiClient` for the authentication, content,
//! review, support and admin endpoints. Every request reads the current
//! credential from the `SessionStore` at the moment it is built.

pub mod client;
pub mod error;

pub use client::{ApiClient, DashboardStats, VerifyOtpResponse, GOOGLE_USERINFO_URL};
pub use error::ApiError;
