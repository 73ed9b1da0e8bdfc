//! Session extraction for the admin surface.
//!
//! This module provides extractors that pull the operator session token
//! from the `Authorization: Bearer <token>` header. Token validation
//! (liveness, role) happens inside the sync façade; the extractors only
//! parse the header.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use pulse_core::SessionToken;
use pulse_sync::CommandSync;

use crate::error::ApiError;
use crate::state::GatewayState;

/// A session token extracted from a required `Authorization` header.
///
/// Rejects the request with 401 when the header is missing or malformed.
#[derive(Debug, Clone, Copy)]
pub struct SessionBearer(pub SessionToken);

/// A session token extracted from an optional `Authorization` header.
///
/// Absent header yields `None`; a present but malformed header is still
/// rejected, so a caller cannot silently fall through to the
/// unauthenticated path by sending garbage.
#[derive(Debug, Clone, Copy)]
pub struct MaybeSession(pub Option<SessionToken>);

fn parse_bearer(parts: &Parts) -> Result<Option<SessionToken>, ApiError> {
    let Some(header) = parts.headers.get("authorization") else {
        return Ok(None);
    };
    let value = header.to_str().map_err(|_| ApiError::Unauthorized)?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;
    let token = SessionToken::from_str(token).map_err(|_| ApiError::Unauthorized)?;
    Ok(Some(token))
}

impl<C> FromRequestParts<Arc<GatewayState<C>>> for SessionBearer
where
    C: CommandSync + 'static,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 Arc<GatewayState<C>>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let token = parse_bearer(parts)?.ok_or(ApiError::Unauthorized)?;
            Ok(Self(token))
        })
    }
}

impl<C> FromRequestParts<Arc<GatewayState<C>>> for MaybeSession
where
    C: CommandSync + 'static,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 Arc<GatewayState<C>>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move { Ok(Self(parse_bearer(parts)?)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header("authorization", value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn missing_header_is_none() {
        let parts = parts_with_auth(None);
        assert!(parse_bearer(&parts).unwrap().is_none());
    }

    #[test]
    fn valid_bearer_parses() {
        let token = SessionToken::generate();
        let parts = parts_with_auth(Some(&format!("Bearer {token}")));
        assert_eq!(parse_bearer(&parts).unwrap(), Some(token));
    }

    #[test]
    fn malformed_header_rejected() {
        for bad in ["Basic abc", "Bearer not-a-uuid", "Bearer "] {
            let parts = parts_with_auth(Some(bad));
            assert!(parse_bearer(&parts).is_err());
        }
    }
}
