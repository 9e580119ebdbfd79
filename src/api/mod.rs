//! HTTP access to the remote regatta service. One generic client covers both
//! collections; the record type picks the path through [`Resource`].
//!
//! [`Resource`]: crate::models::Resource

mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;
