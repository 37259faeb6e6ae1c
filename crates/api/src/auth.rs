//! Caller identity extraction.
//!
//! The server sits behind a gateway that authenticates callers and
//! forwards their identity in two headers: `x-role` (one of `store`,
//! `courier`, `admin`) and `x-actor-id` (the store or courier id;
//! admins carry none). Requests without a usable identity are
//! rejected with `401` before any handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::{CourierId, StoreId};
use domain::Actor;

use crate::error::ApiError;

/// Header naming the caller's role.
pub const ROLE_HEADER: &str = "x-role";

/// Header carrying the caller's store or courier id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// The caller's identity, resolved from the gateway headers.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedActor(pub Actor);

impl<S> FromRequestParts<S> for AuthenticatedActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = match header_value(parts, ROLE_HEADER)? {
            "admin" => Actor::Admin,
            "store" => Actor::Store(StoreId::new(actor_id(parts)?)),
            "courier" => Actor::Courier(CourierId::new(actor_id(parts)?)),
            other => {
                metrics::counter!("auth_rejections_total").increment(1);
                return Err(ApiError::Unauthorized(format!("unknown role {other:?}")));
            }
        };

        Ok(AuthenticatedActor(actor))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    let value = parts.headers.get(name).ok_or_else(|| {
        metrics::counter!("auth_rejections_total").increment(1);
        ApiError::Unauthorized(format!("missing {name} header"))
    })?;

    value.to_str().map(str::trim).map_err(|_| {
        metrics::counter!("auth_rejections_total").increment(1);
        ApiError::Unauthorized(format!("malformed {name} header"))
    })
}

fn actor_id(parts: &Parts) -> Result<i64, ApiError> {
    header_value(parts, ACTOR_ID_HEADER)?.parse().map_err(|_| {
        metrics::counter!("auth_rejections_total").increment(1);
        ApiError::Unauthorized(format!("malformed {ACTOR_ID_HEADER} header"))
    })
}
