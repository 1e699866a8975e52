use axum::http::{HeaderMap, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::app_error::{AppError, AppResult};

/// Static bearer-secret check guarding the administrative endpoints. Every
/// admin handler calls this before doing anything else. The comparison is
/// constant-time over the full expected header value.
pub fn authorize(headers: &HeaderMap, admin_secret: &SecretString) -> AppResult<()> {
    let Some(header) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return Err(AppError::Unauthorized);
    };

    let expected = format!("Bearer {}", admin_secret.expose_secret());
    // ct_eq requires equal lengths; a length mismatch already rules out a
    // match and reveals nothing beyond the response itself.
    if header.len() == expected.len()
        && bool::from(header.as_bytes().ct_eq(expected.as_bytes()))
    {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}
