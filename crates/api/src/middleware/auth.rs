//! Optional caller identity.
//!
//! Newsletter signup works anonymously; when a valid session token is
//! presented we link the subscription to the account. Any failure here
//! degrades to an anonymous request, it never rejects.

use axum::http::{header, HeaderMap, HeaderValue};
use cadencea_core::ids::hash_session_token;
use tracing::warn;

use crate::state::AppState;

pub async fn optional_user_id(state: &AppState, headers: &HeaderMap) -> Option<String> {
    let token = headers.get(header::AUTHORIZATION).and_then(parse_bearer)?;
    let hash = hash_session_token(token);

    match cadencea_db::queries::sessions::find_user_by_token_hash(&state.db, &hash).await {
        Ok(user_id) => user_id,
        Err(err) => {
            warn!(error = %err, "session lookup failed, treating caller as anonymous");
            None
        }
    }
}

fn parse_bearer(value: &HeaderValue) -> Option<&str> {
    let value = value.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default();
    if scheme != "Bearer" || token.is_empty() {
        return None;
    }
    Some(token)
}
