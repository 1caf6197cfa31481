//! Field registry, capability flags, and chain composition.
//!
//! Capabilities are decided once, at schema build: a [`FieldSpec`] declares
//! whether its result shape is paginated and whether the field is guarded,
//! and [`SchemaBuilder::finish`] composes the middleware chain accordingly.
//! Nothing inspects type names at resolution time.

mod executor;

use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::AuthenticationResolver;
use crate::collaborators::{AddressBook, ProductCatalog, UserDirectory};
use crate::config::GraphConfig;
use crate::middleware::pagination::PaginationMiddleware;
use crate::middleware::{Resolver, auth as auth_middleware, guard};
use crate::resolvers;
use crate::token::TokenManager;

pub use executor::{FieldFailure, Request, Response, Selection};

/// Handles to the external collaborators the built-in resolvers consume.
#[derive(Clone)]
pub struct GraphDeps {
    /// User directory (lookup, credentials, registration).
    pub directory: Arc<dyn UserDirectory>,
    /// Product catalog (products, categories).
    pub catalog: Arc<dyn ProductCatalog>,
    /// Address book (create, delete).
    pub addresses: Arc<dyn AddressBook>,
}

/// One field's resolver plus its build-time capability flags.
pub struct FieldSpec {
    name: &'static str,
    resolver: Resolver,
    guarded: bool,
    paginated: bool,
}

impl FieldSpec {
    /// A public, unpaginated field.
    #[must_use]
    pub fn new(name: &'static str, resolver: Resolver) -> Self {
        Self {
            name,
            resolver,
            guarded: false,
            paginated: false,
        }
    }

    /// Require an authenticated caller for this field.
    #[must_use]
    pub fn guarded(mut self) -> Self {
        self.guarded = true;
        self
    }

    /// Mark the field's result shape as a page envelope over a lazy
    /// sequence.
    #[must_use]
    pub fn paginated(mut self) -> Self {
        self.paginated = true;
        self
    }
}

/// Collects field specs, then composes the middleware chains.
pub struct SchemaBuilder {
    pagination: PaginationMiddleware,
    fields: Vec<FieldSpec>,
}

impl SchemaBuilder {
    /// Start a builder with the configured page size.
    #[must_use]
    pub const fn new(page_size: u32) -> Self {
        Self {
            pagination: PaginationMiddleware::new(page_size),
            fields: Vec::new(),
        }
    }

    /// Register a field. A later spec with the same name replaces the
    /// earlier one.
    pub fn field(&mut self, spec: FieldSpec) -> &mut Self {
        self.fields.push(spec);
        self
    }

    /// Compose each field's chain and seal the schema.
    ///
    /// Per field, innermost to outermost: resolver, permission guard (if
    /// guarded), pagination (if paginated), identity resolution (always).
    /// Identity resolution outermost guarantees the context's identity cell
    /// is written before any guard or pagination logic reads it.
    #[must_use]
    pub fn finish(self, authenticator: Arc<AuthenticationResolver>) -> Schema {
        let mut fields = HashMap::new();
        for spec in self.fields {
            let mut chain = spec.resolver;
            if spec.guarded {
                chain = guard::wrap(chain);
            }
            if spec.paginated {
                chain = self.pagination.wrap(chain);
            }
            chain = auth_middleware::wrap(chain);
            fields.insert(spec.name, chain);
        }
        Schema {
            fields,
            authenticator,
        }
    }
}

/// The sealed field registry plus everything a request needs to execute.
pub struct Schema {
    fields: HashMap<&'static str, Resolver>,
    authenticator: Arc<AuthenticationResolver>,
}

impl Schema {
    /// Build the standard Greenstall schema: token manager and
    /// authentication resolver from `config`, built-in commerce fields wired
    /// to `deps`.
    #[must_use]
    pub fn build(config: &GraphConfig, deps: &GraphDeps) -> Self {
        let tokens = TokenManager::new(config.signing_secret.clone(), config.tokens.clone());
        let authenticator = Arc::new(AuthenticationResolver::new(
            tokens.clone(),
            Arc::clone(&deps.directory),
            &config.auth,
        ));

        let mut builder = Self::builder(config.page_size);
        resolvers::register(&mut builder, deps, &tokens);
        builder.finish(authenticator)
    }

    /// An empty builder, for embedders that register their own fields.
    #[must_use]
    pub const fn builder(page_size: u32) -> SchemaBuilder {
        SchemaBuilder::new(page_size)
    }

    /// Names of all registered fields.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub(crate) fn resolver(&self, name: &str) -> Option<Resolver> {
        self.fields.get(name).cloned()
    }

    pub(crate) fn authenticator(&self) -> Arc<AuthenticationResolver> {
        Arc::clone(&self.authenticator)
    }
}
