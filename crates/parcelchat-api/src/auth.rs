//! Bearer token authentication.
//!
//! Tokens never reject a request here. Unknown or missing tokens produce an
//! anonymous actor and the admin operations answer 401 or 403 themselves.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use parcelchat_core::Actor;

use crate::state::AppState;

/// The caller as identified by its bearer token
#[derive(Debug, Clone)]
pub struct Caller(pub Actor);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let role = bearer_token(&parts.headers).and_then(|token| state.config.auth.role_for(token));
        Ok(Caller(role.map_or_else(Actor::anonymous, Actor::with_role)))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
