//! User and session routes
//!
//! Signup and login return the access token in the response body (client
//! script must attach it to Authorization headers) while the refresh
//! token travels only in an HTTP-only cookie. That asymmetry is
//! deliberate: script can never read the refresh token.

use crate::auth::{self, CurrentUser};
use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::repositories::{PublicUser, Role, UserRepository};
use crate::services::AuthService;
use crate::state::AppState;
use crate::validation::ValidatedJson;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Name of the refresh-token cookie
const REFRESH_COOKIE: &str = "jwt";

const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Create user/session routes
pub fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh", get(refresh))
        .route(
            "/logout",
            post(logout)
                .layer(middleware::from_fn_with_state(state.clone(), auth::protect)),
        )
        .route(
            "/me",
            get(me).layer(middleware::from_fn_with_state(state.clone(), auth::protect)),
        )
        .route(
            "/",
            get(list_users)
                .layer(middleware::from_fn(|req, next| {
                    auth::restrict_to(ADMIN_ONLY, req, next)
                }))
                .layer(middleware::from_fn_with_state(state, auth::protect)),
        )
}

/// Signup request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 2, message = "Name is too short"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords don't match"))]
    pub password_confirm: String,
}

/// Login request body
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response for signup/login: access token plus the sanitized user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: PublicUser,
}

/// Response for refresh: a new access token only
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// Generic message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Build the refresh cookie: HTTP-only, same-site restricted, lifetime
/// matching the refresh token itself.
fn refresh_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.auth.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.auth.refresh_token_expiry_secs))
        .build()
}

/// Overwrite the refresh cookie with a sentinel that expires almost
/// immediately, so the browser discards it.
fn logged_out_cookie(config: &AppConfig) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, "loggedout"))
        .path("/")
        .http_only(true)
        .secure(config.auth.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(10))
        .build()
}

/// POST /api/v1/users/signup
async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let session =
        AuthService::signup(state.db(), state.tokens(), &req.name, &req.email, &req.password)
            .await?;

    let jar = jar.add(refresh_cookie(session.refresh_token, state.config()));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            access_token: session.access_token,
            user: session.user,
        }),
    ))
}

/// POST /api/v1/users/login
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = AuthService::login(state.db(), state.tokens(), &req.email, &req.password).await?;

    let jar = jar.add(refresh_cookie(session.refresh_token, state.config()));

    Ok((
        jar,
        Json(AuthResponse {
            access_token: session.access_token,
            user: session.user,
        }),
    ))
}

/// GET /api/v1/users/refresh - mint a new access token from the cookie
async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<Json<AccessTokenResponse>> {
    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| {
            ApiError::Unauthenticated(
                "You are not logged in! Please login to get access.".to_string(),
            )
        })?;

    let access_token = AuthService::refresh(state.db(), state.tokens(), &presented).await?;

    Ok(Json(AccessTokenResponse { access_token }))
}

/// POST /api/v1/users/logout - requires authentication
async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    AuthService::logout(state.db(), user.id).await?;

    let jar = jar.add(logged_out_cookie(state.config()));

    Ok((
        jar,
        Json(MessageResponse {
            message: "User logged out successfully".to_string(),
        }),
    ))
}

/// GET /api/v1/users/me - the authenticated user's own representation
async fn me(user: CurrentUser) -> Json<PublicUser> {
    Json(PublicUser {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    })
}

/// GET /api/v1/users - admin only
async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = UserRepository::list(state.db()).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig::default()
    }

    #[test]
    fn test_refresh_cookie_attributes() {
        let config = test_config();
        let cookie = refresh_cookie("token-value".to_string(), &config);

        assert_eq!(cookie.name(), "jwt");
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(
                config.auth.refresh_token_expiry_secs
            ))
        );
    }

    #[test]
    fn test_logged_out_cookie_is_short_lived() {
        let config = test_config();
        let cookie = logged_out_cookie(&config);

        assert_eq!(cookie.name(), "jwt");
        assert_eq!(cookie.value(), "loggedout");
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(10)));
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[test]
    fn test_signup_request_rejects_mismatched_passwords() {
        let req = SignupRequest {
            name: "Ann".to_string(),
            email: "a@x.com".to_string(),
            password: "secret123".to_string(),
            password_confirm: "secret124".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_signup_request_accepts_valid_input() {
        let req = SignupRequest {
            name: "Ann".to_string(),
            email: "a@x.com".to_string(),
            password: "secret123".to_string(),
            password_confirm: "secret123".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_login_request_requires_password() {
        let req = LoginRequest {
            email: "a@x.com".to_string(),
            password: "".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
