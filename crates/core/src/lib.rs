//! kiosk-core - Shared types library.
//!
//! This crate provides common types used across all kiosk components:
//! - `api` - JSON REST API binary
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database support (sqlx `Type`/`Encode`/`Decode`
//! implementations) is behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, roles, order statuses, and slugs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
