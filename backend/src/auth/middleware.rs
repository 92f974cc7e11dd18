//! Authentication middleware
//!
//! `protect` converts a bearer access token into a resolved, trusted
//! user identity and attaches it to the request; `restrict_to` gates an
//! already-authenticated request by role. An access token is only
//! honored while its user still has a stored refresh token: logging out
//! (or a rotated session) revokes outstanding access tokens immediately,
//! regardless of their own expiry.

use crate::error::ApiError;
use crate::repositories::{Role, UserRepository};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

/// Authenticated user resolved by `protect`
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Middleware guarding protected routes
///
/// Rejections are uniformly 401; the precise sub-cause (missing header,
/// expired token, deleted user, revoked session) is logged at debug
/// level only.
pub async fn protect(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        ApiError::Unauthenticated("You are not logged in! Please login to get access.".to_string())
    })?;

    let claims = state.tokens().decode_access_token(token).map_err(|e| {
        debug!(reason = %e, "access token rejected");
        ApiError::Unauthenticated("Invalid or expired token. Please log in again.".to_string())
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        debug!("access token subject is not a valid user id");
        ApiError::Unauthenticated("Invalid or expired token. Please log in again.".to_string())
    })?;

    let user = UserRepository::find_by_id(state.db(), user_id)
        .await?
        .ok_or_else(|| {
            debug!(%user_id, "token subject no longer exists");
            ApiError::Unauthenticated("The user belonging to this token no longer exists.".to_string())
        })?;

    // No stored refresh token means the session was ended by logout or
    // rotated away; outstanding access tokens die with it.
    if user.refresh_token.is_none() {
        debug!(%user_id, "access token for a revoked session");
        return Err(ApiError::Unauthenticated(
            "User recently logged out. Please log in again.".to_string(),
        ));
    }

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Role gate; must run strictly after `protect`
///
/// It has no authentication logic of its own: a request that never went
/// through `protect` is rejected as unauthenticated, not forbidden.
pub async fn restrict_to(
    allowed: &'static [Role],
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request.extensions().get::<CurrentUser>().ok_or_else(|| {
        ApiError::Unauthenticated("You are not logged in! Please login to get access.".to_string())
    })?;

    if !allowed.contains(&user.role) {
        return Err(ApiError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            ApiError::Unauthenticated(
                "You are not logged in! Please login to get access.".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_wrong_scheme_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);
    }
}
