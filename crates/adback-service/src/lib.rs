//! ADBACK service layer.
//!
//! Operation orchestration on top of the repository traits: account
//! management, ad registration and lifecycle, notices, and login. Every
//! service is generic over the repositories it touches, so this crate has
//! no dependency on the database crate.
//!
//! Authorization decisions are delegated to `adback_core::policy`; this
//! layer sequences existence checks, validation, and store calls around
//! them.

pub mod account;
pub mod ads;
pub mod auth;
pub mod config;
pub mod notice;
pub mod password;
pub mod session;

pub use config::ServiceConfig;
