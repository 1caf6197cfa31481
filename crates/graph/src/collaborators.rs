//! Stable traits the external domain glue lives behind.
//!
//! The pipeline never touches storage directly. Entity schemas, persistence,
//! and business validation live in collaborator implementations; the core
//! consumes them through these traits and treats every record as opaque JSON.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use greenstall_core::{AddressId, Email, Identity, SearchFilter, UserId};

/// Errors surfaced by collaborator implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// The backing service could not be reached or failed mid-operation.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    /// A uniqueness or state conflict (e.g. email already registered).
    #[error("conflict: {0}")]
    Conflict(String),
    /// The target record does not exist.
    #[error("record not found")]
    NotFound,
    /// The target record exists but belongs to a different caller.
    #[error("caller does not own the target record")]
    NotOwner,
    /// A stored record failed to decode.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// A lazily evaluated, ordered sequence of opaque records.
///
/// Nothing is materialized until `count` or `slice` is called; the
/// pagination middleware drives both.
#[async_trait]
pub trait RecordSeq: Send + Sync {
    /// Total number of records in the sequence.
    async fn count(&self) -> Result<u64, CollaboratorError>;

    /// The window `[offset, offset + limit)`, in sequence order. A window
    /// past the end yields an empty vector.
    async fn slice(&self, offset: u64, limit: u64) -> Result<Vec<serde_json::Value>, CollaboratorError>;
}

/// Profile data for a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: Email,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// The external user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a caller identity by its identifier.
    async fn lookup(&self, id: UserId) -> Result<Option<Identity>, CollaboratorError>;

    /// Check a credential pair, yielding the identity when it matches.
    async fn verify_credentials(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Option<Identity>, CollaboratorError>;

    /// Create a new account.
    ///
    /// Implementations return [`CollaboratorError::Conflict`] when the email
    /// is already registered.
    async fn register(&self, profile: NewUser) -> Result<Identity, CollaboratorError>;

    /// All directory entries as a lazy ordered sequence.
    fn records(&self) -> Arc<dyn RecordSeq>;
}

/// The external product catalog.
pub trait ProductCatalog: Send + Sync {
    /// Products, optionally narrowed by a search predicate the catalog
    /// evaluates itself.
    fn products(&self, search: Option<SearchFilter>) -> Arc<dyn RecordSeq>;

    /// All categories.
    fn categories(&self) -> Arc<dyn RecordSeq>;
}

/// Input for creating an address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewAddress {
    pub country: String,
    pub city: String,
    pub street: String,
    #[serde(default)]
    pub is_default: bool,
}

/// A stored address, owned by one caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub owner: UserId,
    pub country: String,
    pub city: String,
    pub street: String,
    pub is_default: bool,
}

/// The external address book.
#[async_trait]
pub trait AddressBook: Send + Sync {
    /// Store a new address for `owner`.
    async fn create(&self, owner: UserId, address: NewAddress) -> Result<Address, CollaboratorError>;

    /// Delete an address. Returns `false` when no such address exists and
    /// [`CollaboratorError::NotOwner`] when it belongs to someone else.
    async fn delete(&self, owner: UserId, id: AddressId) -> Result<bool, CollaboratorError>;
}
