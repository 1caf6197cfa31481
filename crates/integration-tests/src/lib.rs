//! Integration test support for Greenstall.
//!
//! In-memory implementations of the collaborator traits, plus a harness
//! that wires them into a schema the way an embedder would. The scenario
//! tests live in `tests/`.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use serde_json::{Value, json};

use greenstall_core::{AddressId, Email, Identity, SearchFilter, UserId};
use greenstall_graph::collaborators::{
    Address, AddressBook, CollaboratorError, NewAddress, NewUser, ProductCatalog, RecordSeq,
    UserDirectory,
};
use greenstall_graph::{AuthConfig, GraphConfig, GraphDeps, Schema, TokenConfig, TokenManager};
use secrecy::SecretString;
use tokio::sync::Mutex;

/// A materialized record sequence. "Lazy" from the pipeline's point of
/// view: nothing is counted or sliced until asked.
pub struct VecSeq {
    rows: Vec<Value>,
}

impl VecSeq {
    #[must_use]
    pub const fn new(rows: Vec<Value>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl RecordSeq for VecSeq {
    async fn count(&self) -> Result<u64, CollaboratorError> {
        Ok(self.rows.len() as u64)
    }

    async fn slice(&self, offset: u64, limit: u64) -> Result<Vec<Value>, CollaboratorError> {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self
            .rows
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// In-memory user directory with a lookup call counter and an optional
/// artificial delay, for exactly-once and timeout scenarios.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: Mutex<Vec<(Identity, String)>>,
    lookup_calls: AtomicUsize,
    lookup_delay: Option<Duration>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory whose lookups stall for `delay` before answering.
    #[must_use]
    pub fn slow(delay: Duration) -> Self {
        Self {
            lookup_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Seed an account; returns its identity.
    pub async fn seed_user(&self, email: &str, password: &str, first: &str, last: &str) -> Identity {
        let identity = Identity {
            id: UserId::random(),
            email: Email::parse(email).unwrap(),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            is_active: true,
            is_staff: false,
            created_at: Utc::now(),
        };
        self.users
            .lock()
            .await
            .push((identity.clone(), password.to_owned()));
        identity
    }

    /// How many times `lookup` has been invoked.
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn lookup(&self, id: UserId) -> Result<Option<Identity>, CollaboratorError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|(identity, _)| identity.id == id)
            .map(|(identity, _)| identity.clone()))
    }

    async fn verify_credentials(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Option<Identity>, CollaboratorError> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|(identity, stored)| identity.email == *email && stored == password)
            .map(|(identity, _)| identity.clone()))
    }

    async fn register(&self, profile: NewUser) -> Result<Identity, CollaboratorError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|(identity, _)| identity.email == profile.email) {
            return Err(CollaboratorError::Conflict(format!(
                "email already registered: {}",
                profile.email
            )));
        }
        let identity = Identity {
            id: UserId::random(),
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            is_active: true,
            is_staff: false,
            created_at: Utc::now(),
        };
        users.push((identity.clone(), profile.password));
        Ok(identity)
    }

    fn records(&self) -> Arc<dyn RecordSeq> {
        // Ordered snapshot of the directory, insertion order.
        let rows = self
            .users
            .try_lock()
            .map(|users| {
                users
                    .iter()
                    .map(|(identity, _)| serde_json::to_value(identity).unwrap())
                    .collect()
            })
            .unwrap_or_default();
        Arc::new(VecSeq::new(rows))
    }
}

/// In-memory product catalog. Search predicates are evaluated with
/// [`SearchFilter::matches`], the way a real backend would translate the
/// clauses into its own query language.
pub struct InMemoryCatalog {
    products: Vec<Value>,
    categories: Vec<Value>,
}

impl InMemoryCatalog {
    #[must_use]
    pub const fn new(products: Vec<Value>, categories: Vec<Value>) -> Self {
        Self {
            products,
            categories,
        }
    }

    /// `count` numbered products, `product-1` .. `product-N`.
    #[must_use]
    pub fn numbered(count: usize) -> Self {
        let products = (1..=count)
            .map(|n| json!({"name": format!("product-{n}"), "description": format!("item {n}")}))
            .collect();
        Self::new(products, vec![json!({"name": "general"})])
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn products(&self, search: Option<SearchFilter>) -> Arc<dyn RecordSeq> {
        let rows = match search {
            Some(filter) => self
                .products
                .iter()
                .filter(|row| filter.matches(row))
                .cloned()
                .collect(),
            None => self.products.clone(),
        };
        Arc::new(VecSeq::new(rows))
    }

    fn categories(&self) -> Arc<dyn RecordSeq> {
        Arc::new(VecSeq::new(self.categories.clone()))
    }
}

/// In-memory address book enforcing ownership.
#[derive(Default)]
pub struct InMemoryAddressBook {
    addresses: Mutex<Vec<Address>>,
}

impl InMemoryAddressBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an address for an owner; returns its id.
    pub async fn seed_address(&self, owner: UserId, city: &str) -> AddressId {
        let id = AddressId::random();
        self.addresses.lock().await.push(Address {
            id,
            owner,
            country: "Testland".to_owned(),
            city: city.to_owned(),
            street: "1 Main St".to_owned(),
            is_default: false,
        });
        id
    }
}

#[async_trait]
impl AddressBook for InMemoryAddressBook {
    async fn create(&self, owner: UserId, address: NewAddress) -> Result<Address, CollaboratorError> {
        let stored = Address {
            id: AddressId::random(),
            owner,
            country: address.country,
            city: address.city,
            street: address.street,
            is_default: address.is_default,
        };
        self.addresses.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, owner: UserId, id: AddressId) -> Result<bool, CollaboratorError> {
        let mut addresses = self.addresses.lock().await;
        let Some(position) = addresses.iter().position(|address| address.id == id) else {
            return Ok(false);
        };
        let found = addresses.get(position).unwrap();
        if found.owner != owner {
            return Err(CollaboratorError::NotOwner);
        }
        addresses.remove(position);
        Ok(true)
    }
}

/// Test configuration: deterministic, short timeouts, small pages.
#[must_use]
pub fn test_config() -> GraphConfig {
    GraphConfig {
        signing_secret: SecretString::from("k4T%bQ9@wZ2!nF7#xV5^mJ1&hL8*pD3$"),
        auth: AuthConfig {
            scheme_prefix_len: 4,
            lookup_timeout: Duration::from_millis(100),
        },
        tokens: TokenConfig {
            access_ttl: chrono::Duration::minutes(5),
            refresh_ttl: chrono::Duration::days(7),
            clock_skew: chrono::Duration::zero(),
        },
        page_size: 3,
    }
}

/// Everything a scenario test needs, wired the way an embedder would.
pub struct TestHarness {
    pub schema: Schema,
    pub tokens: TokenManager,
    pub config: GraphConfig,
    pub directory: Arc<InMemoryDirectory>,
    pub addresses: Arc<InMemoryAddressBook>,
}

impl TestHarness {
    /// Default harness: seven numbered products, default config.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(
            test_config(),
            Arc::new(InMemoryDirectory::new()),
            Arc::new(InMemoryCatalog::numbered(7)),
        )
    }

    /// Build from explicit parts.
    #[must_use]
    pub fn with_parts(
        config: GraphConfig,
        directory: Arc<InMemoryDirectory>,
        catalog: Arc<InMemoryCatalog>,
    ) -> Self {
        let addresses = Arc::new(InMemoryAddressBook::new());
        let deps = GraphDeps {
            directory: Arc::clone(&directory) as Arc<dyn UserDirectory>,
            catalog,
            addresses: Arc::clone(&addresses) as Arc<dyn AddressBook>,
        };
        let schema = Schema::build(&config, &deps);
        let tokens = TokenManager::new(config.signing_secret.clone(), config.tokens.clone());
        Self {
            schema,
            tokens,
            config,
            directory,
            addresses,
        }
    }

    /// An access token for an identity, as minted at login.
    #[must_use]
    pub fn access_token_for(&self, identity: &Identity) -> String {
        self.tokens
            .issue_access(&identity.id.to_string())
            .unwrap()
            .into_string()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Headers carrying a credential under the default `"JWT "` scheme.
#[must_use]
pub fn auth_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("JWT {token}")).unwrap(),
    );
    headers
}

/// Convert a JSON object literal into field arguments.
#[must_use]
pub fn args(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}
