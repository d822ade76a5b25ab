//! Core types for kiosk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod role;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use role::Role;
pub use slug::slugify;
pub use status::OrderStatus;
