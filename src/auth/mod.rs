use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::state::AppState;

/// Gate for the `/api/*` routes.
///
/// When the server is started with `ACCESS_SECRET`, callers must send it as
/// a bearer token. Without a configured secret every request passes.
pub struct AccessGuard;

#[async_trait]
impl FromRequestParts<AppState> for AccessGuard {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(secret) = state.access_secret.as_deref() else {
            return Ok(AccessGuard);
        };

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Auth("Missing or invalid Authorization header".into()))?;

        if !secrets_match(bearer.token(), secret) {
            tracing::debug!("Rejected request with wrong access secret");
            return Err(AppError::Auth("Invalid access secret".into()));
        }

        Ok(AccessGuard)
    }
}

/// Constant-time comparison of a presented token against the configured
/// secret. Both sides are hashed first so the length of the secret does not
/// leak through timing either.
pub(crate) fn secrets_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
