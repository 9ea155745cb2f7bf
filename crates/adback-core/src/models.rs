//! Domain models for ADBACK.
//!
//! These are the core types shared across all crates.

pub mod ad;
pub mod identity;
pub mod notice;
pub mod organization;
pub mod user;
