//! ADBACK Core — domain models, error taxonomy, repository traits, and the
//! pure business engines of the advertisement back office:
//!
//! - [`policy`] — role-based visibility scopes, field masks, and operation
//!   authorization for the Master → Agency → Advertiser hierarchy
//! - [`cascade`] — deletion planning that preserves referential integrity
//! - [`stats`] — grouped counts over a caller's visible scope
//! - [`lifecycle`] — derived ad schedule fields
//!
//! Everything in this crate is storage-agnostic; the repository traits in
//! [`repository`] are implemented by `adback-db`.

pub mod cascade;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod policy;
pub mod repository;
pub mod stats;

pub use error::{AdbackError, AdbackResult};
