//! Greenstall Core - Shared types library.
//!
//! This crate provides common types used across all Greenstall components:
//! - `graph` - Query-graph execution pipeline (auth, pagination, search)
//! - `cli` - Command-line tools for token management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no async, no collaborator
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email addresses, caller identities, the page
//!   envelope, and search predicates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
