//! Request execution with per-field error isolation.
//!
//! One logical resolution pass per request: a fresh [`ExecutionContext`] is
//! created, every selected field is evaluated (concurrently - the design is
//! also correct under sequential traversal), and the results are merged into
//! a response tree. A failure inside one field fills that field's slot with
//! `null` and records a [`FieldFailure`]; siblings are never affected.
//!
//! Cancellation: dropping the execution future abandons all pending resolver
//! invocations, and the context - identity cell included - is dropped with
//! it. Nothing survives into a later request.

use std::sync::Arc;

use futures_util::future::join_all;
use http::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::context::ExecutionContext;
use crate::error::FieldError;
use crate::middleware::{Args, ResolverValue};

use super::Schema;

/// One selected field and its arguments.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Registered field name.
    pub field: String,
    /// Field arguments.
    pub args: Args,
}

impl Selection {
    /// Select a field with arguments.
    pub fn new(field: impl Into<String>, args: Args) -> Self {
        Self {
            field: field.into(),
            args,
        }
    }
}

/// A full request: raw headers plus the selected fields.
#[derive(Debug, Clone)]
pub struct Request {
    /// Raw request headers; the credential is extracted from these.
    pub headers: HeaderMap,
    /// Fields to resolve, in selection order.
    pub selections: Vec<Selection>,
}

impl Request {
    /// A request with no selections yet.
    #[must_use]
    pub const fn new(headers: HeaderMap) -> Self {
        Self {
            headers,
            selections: Vec::new(),
        }
    }

    /// Add a selection.
    #[must_use]
    pub fn select(mut self, field: impl Into<String>, args: Args) -> Self {
        self.selections.push(Selection::new(field, args));
        self
    }
}

/// An error recorded against one field's slot.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldFailure {
    /// The field the failure is scoped to.
    pub field: String,
    /// Stable category code (see [`FieldError::code`]).
    pub code: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// The merged response tree.
#[derive(Debug, Clone, Serialize, Default)]
pub struct Response {
    /// Per-field results, `null` where resolution failed.
    pub data: serde_json::Map<String, Value>,
    /// Failures, one entry per failed field.
    pub errors: Vec<FieldFailure>,
}

impl Response {
    /// The value resolved for a field, if any.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// The failure recorded for a field, if any.
    #[must_use]
    pub fn error_for(&self, name: &str) -> Option<&FieldFailure> {
        self.errors.iter().find(|failure| failure.field == name)
    }

    /// Whether every selected field resolved.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Schema {
    /// Execute one request.
    ///
    /// Sibling selections are evaluated concurrently; the shared identity
    /// cell in the context keeps authentication exactly-once regardless.
    pub async fn execute(&self, request: Request) -> Response {
        let ctx = Arc::new(ExecutionContext::new(
            request.headers,
            self.authenticator(),
        ));

        let evaluations = request.selections.into_iter().map(|selection| {
            let ctx = Arc::clone(&ctx);
            let resolver = self.resolver(&selection.field);
            async move {
                let outcome = match resolver {
                    Some(resolver) => resolver(ctx, selection.args).await.and_then(finalize),
                    None => Err(FieldError::InvalidArguments(format!(
                        "unknown field: {}",
                        selection.field
                    ))),
                };
                (selection.field, outcome)
            }
        });

        let mut response = Response::default();
        for (field, outcome) in join_all(evaluations).await {
            match outcome {
                Ok(value) => {
                    response.data.insert(field, value);
                }
                Err(err) => {
                    debug!(field = %field, code = err.code(), "field resolution failed");
                    response.data.insert(field.clone(), Value::Null);
                    response.errors.push(FieldFailure {
                        field,
                        code: err.code(),
                        message: err.to_string(),
                    });
                }
            }
        }
        response
    }
}

/// Collapse a resolver value into response JSON.
///
/// A lazy sequence reaching this point means a sequence-producing resolver
/// was registered without the `paginated` capability; that is a schema bug,
/// reported as an internal error on the field.
fn finalize(value: ResolverValue) -> Result<Value, FieldError> {
    match value {
        ResolverValue::Json(value) => Ok(value),
        ResolverValue::Sequence(_) => Err(FieldError::Internal(
            "record sequence escaped the pagination middleware".to_owned(),
        )),
    }
}
