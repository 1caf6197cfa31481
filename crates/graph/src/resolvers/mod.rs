//! Built-in query and mutation fields.
//!
//! These are thin: argument parsing, a collaborator call, an error mapping.
//! Identity resolution, guarding, and pagination are middleware concerns;
//! none of the resolvers here know about them.

pub mod products;
pub mod users;

use std::sync::Arc;

use crate::collaborators::RecordSeq;
use crate::error::FieldError;
use crate::middleware::{Args, ResolverValue};
use crate::schema::{FieldSpec, GraphDeps, SchemaBuilder};
use crate::token::TokenManager;

/// Register the standard Greenstall fields.
pub(crate) fn register(builder: &mut SchemaBuilder, deps: &GraphDeps, tokens: &TokenManager) {
    builder
        .field(FieldSpec::new("me", users::me()).guarded())
        .field(FieldSpec::new("users", users::users(Arc::clone(&deps.directory))).paginated())
        .field(
            FieldSpec::new("products", products::products(Arc::clone(&deps.catalog))).paginated(),
        )
        .field(FieldSpec::new(
            "categories",
            products::categories(Arc::clone(&deps.catalog)),
        ))
        .field(FieldSpec::new(
            "registerUser",
            users::register(Arc::clone(&deps.directory)),
        ))
        .field(FieldSpec::new(
            "loginUser",
            users::login(Arc::clone(&deps.directory), tokens.clone()),
        ))
        .field(FieldSpec::new(
            "refreshAccess",
            users::refresh_access(tokens.clone()),
        ))
        .field(
            FieldSpec::new(
                "createAddress",
                users::create_address(Arc::clone(&deps.addresses)),
            )
            .guarded(),
        )
        .field(
            FieldSpec::new(
                "deleteAddress",
                users::delete_address(Arc::clone(&deps.addresses)),
            )
            .guarded(),
        );
}

// =============================================================================
// Argument helpers
// =============================================================================

/// A required, non-empty string argument.
pub(crate) fn require_str(args: &Args, name: &str) -> Result<String, FieldError> {
    match args.get(name) {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(serde_json::Value::String(_)) => Err(FieldError::InvalidArguments(format!(
            "{name} must not be empty"
        ))),
        Some(_) => Err(FieldError::InvalidArguments(format!(
            "{name} must be a string"
        ))),
        None => Err(FieldError::InvalidArguments(format!("{name} is required"))),
    }
}

/// An optional string argument; `null` counts as absent.
pub(crate) fn optional_str(args: &Args, name: &str) -> Result<Option<String>, FieldError> {
    match args.get(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(FieldError::InvalidArguments(format!(
            "{name} must be a string"
        ))),
    }
}

/// An optional boolean argument, defaulting to `false`.
pub(crate) fn optional_bool(args: &Args, name: &str) -> Result<bool, FieldError> {
    match args.get(name) {
        None | Some(serde_json::Value::Null) => Ok(false),
        Some(serde_json::Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(FieldError::InvalidArguments(format!(
            "{name} must be a boolean"
        ))),
    }
}

/// Fully evaluate an (unpaginated) sequence into a JSON array.
pub(crate) async fn materialize(seq: Arc<dyn RecordSeq>) -> Result<ResolverValue, FieldError> {
    let total = seq.count().await.map_err(FieldError::internal)?;
    let rows = if total == 0 {
        Vec::new()
    } else {
        seq.slice(0, total).await.map_err(FieldError::internal)?
    };
    Ok(ResolverValue::Json(serde_json::Value::Array(rows)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn args(value: serde_json::Value) -> Args {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_require_str() {
        let args = args(json!({"email": "a@b.c", "blank": "", "count": 3}));
        assert_eq!(require_str(&args, "email").unwrap(), "a@b.c");
        assert!(require_str(&args, "blank").is_err());
        assert!(require_str(&args, "count").is_err());
        assert!(require_str(&args, "missing").is_err());
    }

    #[test]
    fn test_optional_str_treats_null_as_absent() {
        let args = args(json!({"search": null}));
        assert_eq!(optional_str(&args, "search").unwrap(), None);
    }

    #[test]
    fn test_optional_bool_defaults_to_false() {
        let args = args(json!({"isDefault": true}));
        assert!(optional_bool(&args, "isDefault").unwrap());
        assert!(!optional_bool(&args, "missing").unwrap());
    }
}
