//! Greenstall Graph - Query-graph execution pipeline.
//!
//! This crate is the core of Greenstall: a stateless credential lifecycle
//! (issue/verify/refresh signed tokens) combined with a middleware chain
//! that transparently augments every field resolution with resolved caller
//! identity and paginated-result wrapping.
//!
//! # Architecture
//!
//! - [`token`] - Signed, self-describing access/refresh credentials
//! - [`auth`] - Maps request headers to a caller identity, fail closed
//! - [`context`] - Per-request state with a write-once identity cell
//! - [`middleware`] - Resolver wrapping: auth, permission guard, pagination
//! - [`search`] - Free-text predicate builder for multi-field search
//! - [`schema`] - Field registry, capability flags, and the executor
//! - [`resolvers`] - Built-in commerce query/mutation fields
//! - [`collaborators`] - Stable traits the domain glue lives behind
//!
//! Entity storage, business validation, and transport of the query language
//! are external concerns; they stay behind the [`collaborators`] traits.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod collaborators;
pub mod config;
pub mod context;
pub mod error;
pub mod middleware;
pub mod resolvers;
pub mod schema;
pub mod search;
pub mod token;

pub use auth::AuthenticationResolver;
pub use config::{AuthConfig, ConfigError, GraphConfig, TokenConfig};
pub use context::{CallerIdentity, ExecutionContext};
pub use error::FieldError;
pub use schema::{GraphDeps, Request, Response, Schema, Selection};
pub use search::SearchQueryBuilder;
pub use token::{Claims, SignedToken, TokenError, TokenManager, TokenType};
