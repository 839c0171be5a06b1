//! Authentication for the CareTrack API.
//!
//! Bearer-JWT verification middleware that yields a caller identity and
//! roles. Token issuance belongs to an external identity service; only a
//! dev-token helper is provided for local use and tests.

pub mod authorize;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jwt_simple::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token failed verification
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Server-side configuration problem
    #[error("Auth configuration error: {0}")]
    Config(String),
}

/// Role claims carried inside the JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleClaims {
    /// Roles granted to the subject
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Caller identity extracted from an authenticated request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    /// User ID (JWT subject)
    pub user_id: String,
    /// Roles granted to the user
    pub roles: Vec<String>,
}

impl UserInfo {
    /// True when the user carries the admin role
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == "admin")
    }
}

fn issuer() -> String {
    env::var("JWT_ISSUER").unwrap_or_else(|_| "caretrack-api".to_string())
}

fn signing_key() -> Result<HS256Key, AuthError> {
    let secret = env::var("JWT_SECRET")
        .map_err(|_| AuthError::Config("JWT_SECRET environment variable not found".to_string()))?;
    Ok(HS256Key::from_bytes(secret.as_bytes()))
}

/// Verify a bearer token and extract the caller identity
pub fn verify_token(token: &str) -> Result<UserInfo, AuthError> {
    let key = signing_key()?;

    let mut options = VerificationOptions::default();
    options.allowed_issuers = Some(HashSet::from_strings(&[issuer()]));

    let claims = key
        .verify_token::<RoleClaims>(token, Some(options))
        .map_err(|e| AuthError::TokenValidation(e.to_string()))?;

    let user_id = claims
        .subject
        .ok_or_else(|| AuthError::TokenValidation("Token has no subject".to_string()))?;

    Ok(UserInfo {
        user_id,
        roles: claims.custom.roles,
    })
}

/// Issue a short-lived token for local development and tests
pub fn issue_dev_token(user_id: &str, roles: &[&str]) -> Result<String, AuthError> {
    let key = signing_key()?;
    let custom = RoleClaims {
        roles: roles.iter().map(|r| r.to_string()).collect(),
    };
    let claims = Claims::with_custom_claims(custom, Duration::from_hours(8))
        .with_subject(user_id)
        .with_issuer(issuer());
    key.authenticate(claims)
        .map_err(|e| AuthError::TokenValidation(e.to_string()))
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "success": false,
            "message": message
        })),
    )
        .into_response()
}

/// Authentication middleware for protected routes.
///
/// On success the request extensions carry a `UserInfo` for downstream
/// handlers. In debug builds `BYPASS_AUTH` injects a development identity
/// with full roles.
pub async fn auth_middleware<S>(
    _state: State<S>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if cfg!(debug_assertions) && env::var("BYPASS_AUTH").is_ok() {
        debug!("Auth bypass enabled in development mode");
        req.extensions_mut().insert(UserInfo {
            user_id: "00000000-0000-0000-0000-000000000000".to_string(),
            roles: vec!["admin".to_string(), "healthcare_professional".to_string()],
        });
        return next.run(req).await;
    }

    let request_path = req.uri().path().to_string();

    let auth_header = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(auth_str) => auth_str,
            Err(_) => {
                warn!("Invalid Authorization header format for {}", request_path);
                return unauthorized("Not authorized to access this route");
            }
        },
        None => {
            debug!("Missing Authorization header for {}", request_path);
            return unauthorized("Not authorized to access this route");
        }
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(token) => token,
        None => {
            warn!("Authorization header is not a bearer token for {}", request_path);
            return unauthorized("Not authorized to access this route");
        }
    };

    match verify_token(token) {
        Ok(user) => {
            debug!("Authenticated user {} for {}", user.user_id, request_path);
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(AuthError::Config(message)) => {
            error!("Auth configuration error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": "Authentication is not configured"
                })),
            )
                .into_response()
        }
        Err(e) => {
            warn!("Token rejected for {}: {}", request_path, e);
            unauthorized("Not authorized to access this route")
        }
    }
}
