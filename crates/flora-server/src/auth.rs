//! Bearer-token authentication.
//!
//! Every dictionary route requires `Authorization: Bearer <jwt>` signed with
//! HS256. The token's `sub` claim becomes the [`Caller`] of the request, and
//! that identity is what scopes cached responses to a user.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token not provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

/// Verifica tokens HS256 firmados con un secreto compartido.
///
/// Tokens are issued by the account service; this side only checks them.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(AuthError::InvalidToken)
    }

    /// Extrae el token de un header `Bearer <token>`.
    pub fn bearer_token(header: &str) -> Option<&str> {
        let mut parts = header.split(' ');
        match (parts.next(), parts.next()) {
            (Some("Bearer"), Some(token)) if !token.is_empty() => Some(token),
            _ => None,
        }
    }
}

/// Authenticated identity of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: String,
}

/// Middleware que exige un bearer token valido.
///
/// On success the [`Caller`] is stored in the request extensions for the
/// cache layer and the handlers.
pub async fn require_caller(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(JwtVerifier::bearer_token)
        .ok_or(AuthError::MissingToken)?;

    let claims = state.auth().verify(token).inspect_err(|error| {
        debug!(error = ?error, "Rejected bearer token");
    })?;

    request.extensions_mut().insert(Caller { id: claims.sub });
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}
