//! # Authentication Module
//!
//! Password hashing with Argon2 and stateless JWT sessions.
//!
//! Login issues an access/refresh token pair. Access tokens authenticate API
//! calls through the [`AuthUser`] extractor; refresh tokens are only accepted
//! by the refresh endpoint, which trades them for a new access token.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use clinicbook_core::{
    errors::{ClinicError, ClinicResult},
    models::account::{TokenPairResponse, User, UserRole},
};
use eyre::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Hashes a password using the Argon2 algorithm
///
/// Each call generates a fresh random salt and returns the hash in PHC string
/// format (algorithm, version, parameters, salt and hash).
///
/// # Example
///
/// ```rust
/// # use clinicbook_api::middleware::auth::hash_password;
/// let hashed = hash_password("user_password").unwrap();
/// assert!(hashed.starts_with("$argon2"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a fresh, random salt
    let salt = SaltString::generate(&mut OsRng);

    // Create default Argon2 instance
    let argon2 = Argon2::default();

    // Hash the password with salt
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Checks a plain text password against a stored PHC hash.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| eyre::eyre!("Invalid password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT payload shared by access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub token_type: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

/// Signing key and token lifetimes.
#[derive(Clone)]
pub struct AuthSettings {
    jwt_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl AuthSettings {
    pub fn new(jwt_secret: impl Into<String>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue_token(
        &self,
        user_id: Uuid,
        email: &str,
        role: UserRole,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
    ) -> ClinicResult<String> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role,
            token_type: kind,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| ClinicError::Internal(Box::new(e)))
    }

    pub fn issue_token_pair(&self, user: &User) -> ClinicResult<TokenPairResponse> {
        let now = Utc::now();
        Ok(TokenPairResponse {
            access: self.issue_token(user.id, &user.email, user.role, TokenKind::Access, now)?,
            refresh: self.issue_token(user.id, &user.email, user.role, TokenKind::Refresh, now)?,
        })
    }

    /// Verifies signature and expiry, then checks the token is of the expected kind.
    pub fn decode_token(&self, token: &str, expected: TokenKind) -> ClinicResult<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            debug!("Token rejected: {}", e);
            ClinicError::Authentication("Token is invalid or expired".to_string())
        })?;

        if data.claims.token_type != expected {
            return Err(ClinicError::Authentication(
                "Token has wrong type".to_string(),
            ));
        }

        Ok(data.claims)
    }
}

/// The caller identified by a bearer access token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError(ClinicError::Authorization(
                "Admin role required".to_string(),
            )))
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ClinicError::Authentication("Missing authorization header".to_string()))?;

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ClinicError::Authentication("Invalid authorization header format".to_string())
            })?;

        let claims = state.auth.decode_token(token.trim(), TokenKind::Access)?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}
