//! Password hashing, bearer tokens, and the authenticated-user extractor.
//!
//! Handlers receive the caller as an explicit [`AuthUser`] argument; nothing
//! downstream reads identity from ambient state.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use outreach_core::user::{User, UserId};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{AppState, Backend, Transport, error::Error};

// ─── Passwords ────────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Internal(format!("argon2 error: {e}")))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(password_hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Argon2id hash of no known password, with the default cost parameters.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$\
                          lVSxqFXFEKAkPSaEqHEtt3KcDgfDSL8qB3hYJ6wLBOQ";

/// Check a login attempt. An unknown account still pays for one argon2
/// verification so response time does not reveal which emails exist.
pub fn verify_login(password: &str, stored_hash: Option<&str>) -> bool {
  match stored_hash {
    Some(hash) => verify_password(password, hash),
    None => {
      verify_password(password, DUMMY_HASH);
      false
    }
  }
}

// ─── Tokens ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  /// The user id, as a string.
  pub sub: String,
  pub iat: i64,
  pub exp: i64,
}

/// Issues and validates HS256 session tokens.
#[derive(Clone)]
pub struct TokenService {
  encoding_key:   EncodingKey,
  decoding_key:   DecodingKey,
  expiry_seconds: u64,
}

impl TokenService {
  pub fn new(secret: &str, expiry_seconds: u64) -> Self {
    Self {
      encoding_key: EncodingKey::from_secret(secret.as_bytes()),
      decoding_key: DecodingKey::from_secret(secret.as_bytes()),
      expiry_seconds,
    }
  }

  pub fn issue(&self, user_id: UserId) -> Result<String, Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
      sub: user_id.to_string(),
      iat: now,
      exp: now.saturating_add(i64::try_from(self.expiry_seconds).unwrap_or(i64::MAX)),
    };
    encode(&Header::default(), &claims, &self.encoding_key)
      .map_err(|e| Error::Internal(format!("token error: {e}")))
  }

  /// Validate a token and return the user id it was issued for.
  pub fn verify(&self, token: &str) -> Result<UserId, Error> {
    let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
      .map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        Error::Unauthorized("invalid or expired token")
      })?;
    data
      .claims
      .sub
      .parse()
      .map_err(|_| Error::Unauthorized("invalid or expired token"))
  }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or(Error::Unauthorized("missing bearer token"))
}

// ─── Extractor ────────────────────────────────────────────────────────────────

/// The authenticated caller, freshly loaded from the store.
pub struct AuthUser(pub User);

impl<S, M> FromRequestParts<AppState<S, M>> for AuthUser
where
  S: Backend,
  M: Transport,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M>,
  ) -> Result<Self, Self::Rejection> {
    let user_id = state.tokens.verify(bearer_token(&parts.headers)?)?;
    let user = state
      .store
      .get_user(user_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::Unauthorized("account no longer exists"))?;
    Ok(AuthUser(user))
  }
}
