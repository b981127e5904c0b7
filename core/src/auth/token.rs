// marketplace/core/src/auth/token.rs

//! Signed, time-limited identity assertions (HS256 JWTs).

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{Role, Subject};
use crate::error::{MarketError, MarketResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub: Uuid,
  pub role: Role,
  pub iat: i64,
  pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  validation: Validation,
  ttl: Duration,
}

impl fmt::Debug for TokenService {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TokenService")
      .field("keys", &"[REDACTED]")
      .field("ttl", &self.ttl)
      .finish()
  }
}

impl TokenService {
  pub fn new(signing_key: &[u8], ttl: Duration) -> MarketResult<Self> {
    if signing_key.is_empty() {
      return Err(MarketError::Internal("Token signing key must not be empty.".to_string()));
    }
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    Ok(Self {
      encoding_key: EncodingKey::from_secret(signing_key),
      decoding_key: DecodingKey::from_secret(signing_key),
      validation,
      ttl,
    })
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  pub fn issue(&self, subject: Subject) -> MarketResult<String> {
    self.issue_at(subject, Utc::now())
  }

  /// Issues a token as if the current time were `issued_at`.
  #[instrument(name = "token::issue", skip(self), fields(subject_id = %subject.id, role = %subject.role))]
  pub fn issue_at(&self, subject: Subject, issued_at: DateTime<Utc>) -> MarketResult<String> {
    let claims = Claims {
      sub: subject.id,
      role: subject.role,
      iat: issued_at.timestamp(),
      exp: (issued_at + self.ttl).timestamp(),
    };

    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
      .map_err(|error| MarketError::Internal(format!("Token signing failed: {}", error)))
  }

  /// Checks signature and expiry and resolves the caller.
  pub fn verify(&self, token: &str) -> MarketResult<Subject> {
    let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|error| {
      debug!(error = %error, "Rejected bearer token.");
      MarketError::Unauthenticated("Invalid or expired token".to_string())
    })?;

    Ok(Subject {
      id: data.claims.sub,
      role: data.claims.role,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn service() -> TokenService {
    TokenService::new(b"test-signing-key-with-enough-bytes", Duration::hours(24)).unwrap()
  }

  fn subject() -> Subject {
    Subject {
      id: Uuid::new_v4(),
      role: Role::Customer,
    }
  }

  #[test]
  fn issued_token_verifies_to_same_subject() {
    let tokens = service();
    let subject = subject();
    let token = tokens.issue(subject).unwrap();
    assert_eq!(tokens.verify(&token).unwrap(), subject);
  }

  #[test]
  fn expired_token_is_unauthenticated() {
    let tokens = service();
    let token = tokens.issue_at(subject(), Utc::now() - Duration::hours(25)).unwrap();
    assert!(matches!(tokens.verify(&token), Err(MarketError::Unauthenticated(_))));
  }

  #[test]
  fn token_signed_with_other_key_is_rejected() {
    let foreign = TokenService::new(b"some-other-signing-key", Duration::hours(24)).unwrap();
    let token = foreign.issue(subject()).unwrap();
    assert!(matches!(service().verify(&token), Err(MarketError::Unauthenticated(_))));
  }

  #[test]
  fn tampered_or_garbage_token_is_rejected() {
    let tokens = service();
    let token = tokens.issue(subject()).unwrap();
    let (unsigned, signature) = token.rsplit_once('.').unwrap();
    let first = if signature.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{}.{}{}", unsigned, first, &signature[1..]);

    assert!(tokens.verify(&tampered).is_err());
    assert!(tokens.verify("not.a.token").is_err());
    assert!(tokens.verify("").is_err());
  }

  #[test]
  fn empty_signing_key_is_refused() {
    assert!(TokenService::new(b"", Duration::hours(1)).is_err());
  }
}
