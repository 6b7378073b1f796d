//! JWT session-cookie verification.
//!
//! Chat requests carry a `token` cookie holding an HS256 JWT whose `sub` is
//! the patient id. Verification happens before any request body reaches the
//! agent; a missing or bad token is a plain 401.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Patient id the session belongs to.
    pub sub: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("no session token cookie present")]
    MissingToken,
    #[error("session token is invalid or expired")]
    InvalidToken,
}

/// Pull the `token` cookie out of the request headers and verify it.
pub fn authenticate(headers: &HeaderMap, secret: &SecretString) -> Result<Claims, AuthError> {
    let token = token_from_headers(headers).ok_or(AuthError::MissingToken)?;
    verify(&token, secret)
}

pub fn verify(token: &str, secret: &SecretString) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
    decode::<Claims>(token, &key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

/// Mint a session token. Used by tests and the CLI doctor command; the
/// production issuer lives in the clinic's account system.
pub fn issue(patient_id: &str, secret: &SecretString, ttl_secs: i64) -> Option<String> {
    let claims =
        Claims { sub: patient_id.to_string(), exp: chrono::Utc::now().timestamp() + ttl_secs };
    let key = EncodingKey::from_secret(secret.expose_secret().as_bytes());
    encode(&Header::default(), &claims, &key).ok()
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            if parts.next() == Some(TOKEN_COOKIE) {
                if let Some(value) = parts.next() {
                    return Some(value.trim().to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use axum::http::header::COOKIE;
    use axum::http::HeaderMap;
    use secrecy::SecretString;

    use super::{authenticate, issue, verify, AuthError};

    fn secret() -> SecretString {
        SecretString::from("test-secret")
    }

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value.parse().unwrap());
        headers
    }

    #[test]
    fn issued_tokens_verify_and_carry_the_subject() {
        let token = issue("patient-1", &secret(), 3600).expect("issue");
        let claims = verify(&token, &secret()).expect("verify");
        assert_eq!(claims.sub, "patient-1");
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = issue("patient-1", &secret(), -3600).expect("issue");
        let error = verify(&token, &secret()).unwrap_err();
        assert_eq!(error, AuthError::InvalidToken);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue("patient-1", &secret(), 3600).expect("issue");
        let error = verify(&token, &SecretString::from("other-secret")).unwrap_err();
        assert_eq!(error, AuthError::InvalidToken);
    }

    #[test]
    fn cookie_is_found_among_others() {
        let token = issue("patient-1", &secret(), 3600).expect("issue");
        let headers = headers_with_cookie(&format!("theme=dark; token={token}; lang=en"));
        let claims = authenticate(&headers, &secret()).expect("authenticate");
        assert_eq!(claims.sub, "patient-1");
    }

    #[test]
    fn missing_cookie_is_its_own_error() {
        let error = authenticate(&HeaderMap::new(), &secret()).unwrap_err();
        assert_eq!(error, AuthError::MissingToken);

        let headers = headers_with_cookie("theme=dark");
        let error = authenticate(&headers, &secret()).unwrap_err();
        assert_eq!(error, AuthError::MissingToken);
    }
}
