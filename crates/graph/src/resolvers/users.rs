//! User, credential, and address fields.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use greenstall_core::{AddressId, Email};

use crate::collaborators::{AddressBook, CollaboratorError, NewAddress, NewUser, UserDirectory};
use crate::error::FieldError;
use crate::middleware::{Resolver, ResolverValue, resolver};
use crate::token::{TokenManager, TokenType};

use super::{optional_bool, require_str};

/// `me` - the authorized caller's own identity. Guarded.
pub fn me() -> Resolver {
    resolver(|ctx, _args| async move {
        let caller = ctx.caller().await;
        let identity = caller.identity().ok_or_else(FieldError::unauthenticated)?;
        ResolverValue::json(identity)
    })
}

/// `users` - every directory entry, as a lazy sequence for pagination.
pub fn users(directory: Arc<dyn UserDirectory>) -> Resolver {
    resolver(move |_ctx, _args| {
        let directory = Arc::clone(&directory);
        async move { Ok(ResolverValue::Sequence(directory.records())) }
    })
}

/// `registerUser(email, password, firstName, lastName)` - create an account.
pub fn register(directory: Arc<dyn UserDirectory>) -> Resolver {
    resolver(move |_ctx, args| {
        let directory = Arc::clone(&directory);
        async move {
            let profile = NewUser {
                email: parse_email(&require_str(&args, "email")?)?,
                password: require_str(&args, "password")?,
                first_name: require_str(&args, "firstName")?,
                last_name: require_str(&args, "lastName")?,
            };

            match directory.register(profile).await {
                Ok(identity) => {
                    info!(user = %identity.id, "user registered");
                    ResolverValue::json(&json!({
                        "status": true,
                        "message": "user created successfully",
                    }))
                }
                Err(CollaboratorError::Conflict(_)) => Err(FieldError::InvalidArguments(
                    "an account with this email already exists".to_owned(),
                )),
                Err(err) => Err(FieldError::internal(err)),
            }
        }
    })
}

/// `loginUser(email, password)` - verify credentials and mint a token pair.
pub fn login(directory: Arc<dyn UserDirectory>, tokens: TokenManager) -> Resolver {
    resolver(move |_ctx, args| {
        let directory = Arc::clone(&directory);
        let tokens = tokens.clone();
        async move {
            let email = parse_email(&require_str(&args, "email")?)?;
            let password = require_str(&args, "password")?;

            let identity = directory
                .verify_credentials(&email, &password)
                .await
                .map_err(FieldError::internal)?
                .ok_or_else(|| FieldError::Authentication("invalid credentials".to_owned()))?;

            let sub = identity.id.to_string();
            let access = tokens.issue_access(&sub).map_err(FieldError::internal)?;
            let refresh = tokens.issue_refresh(&sub).map_err(FieldError::internal)?;

            info!(user = %identity.id, "login succeeded");
            ResolverValue::json(&json!({
                "access": access,
                "refresh": refresh,
                "user": identity,
            }))
        }
    })
}

/// `refreshAccess(refresh)` - mint a fresh access token from a refresh
/// token. Verification leaves the type check to us: an access token is
/// rejected here even though its signature is fine.
pub fn refresh_access(tokens: TokenManager) -> Resolver {
    resolver(move |_ctx, args| {
        let tokens = tokens.clone();
        async move {
            let refresh = require_str(&args, "refresh")?;

            let claims = tokens.verify(&refresh).map_err(|_| {
                FieldError::Authentication("invalid or expired refresh token".to_owned())
            })?;
            if claims.token_type != TokenType::Refresh {
                return Err(FieldError::Authentication(
                    "a refresh token is required".to_owned(),
                ));
            }

            let access = tokens
                .issue_access(&claims.sub)
                .map_err(FieldError::internal)?;
            ResolverValue::json(&json!({ "access": access }))
        }
    })
}

/// `createAddress(country, city, street, isDefault)` - store an address for
/// the caller. Guarded.
pub fn create_address(addresses: Arc<dyn AddressBook>) -> Resolver {
    resolver(move |ctx, args| {
        let addresses = Arc::clone(&addresses);
        async move {
            let caller = ctx.caller().await;
            let owner = caller
                .identity()
                .ok_or_else(FieldError::unauthenticated)?
                .id;

            let address = NewAddress {
                country: require_str(&args, "country")?,
                city: require_str(&args, "city")?,
                street: require_str(&args, "street")?,
                is_default: optional_bool(&args, "isDefault")?,
            };

            let stored = addresses
                .create(owner, address)
                .await
                .map_err(FieldError::internal)?;
            ResolverValue::json(&stored)
        }
    })
}

/// `deleteAddress(addressId)` - delete one of the caller's addresses.
/// Guarded; deleting another caller's address is an authorization failure,
/// not an authentication one.
pub fn delete_address(addresses: Arc<dyn AddressBook>) -> Resolver {
    resolver(move |ctx, args| {
        let addresses = Arc::clone(&addresses);
        async move {
            let caller = ctx.caller().await;
            let owner = caller
                .identity()
                .ok_or_else(FieldError::unauthenticated)?
                .id;

            let raw = require_str(&args, "addressId")?;
            let id = AddressId::parse(&raw).map_err(|_| {
                FieldError::InvalidArguments("addressId must be a UUID".to_owned())
            })?;

            match addresses.delete(owner, id).await {
                Ok(deleted) => ResolverValue::json(&json!({ "status": deleted })),
                Err(CollaboratorError::NotOwner) => Err(FieldError::Authorization(
                    "address belongs to another account".to_owned(),
                )),
                Err(err) => Err(FieldError::internal(err)),
            }
        }
    })
}

fn parse_email(raw: &str) -> Result<Email, FieldError> {
    Email::parse(raw).map_err(|err| FieldError::InvalidArguments(err.to_string()))
}
