use super::state::ServerState;

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;
use tracing::debug;

pub const HEADER_USER_ID_KEY: &str = "X-User-Id";

/// The user a request acts for. Requests that carry no usable
/// `X-User-Id` act for the configured fallback identity.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser(pub String);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0
    }
}

fn extract_user_id_from_headers(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(HEADER_USER_ID_KEY)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
        .filter(|id| !id.is_empty())
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        match extract_user_id_from_headers(parts) {
            Some(id) => Ok(CurrentUser(id)),
            None => {
                debug!("No user id header, using fallback identity.");
                Ok(CurrentUser(ctx.config.default_user_id.clone()))
            }
        }
    }
}
