use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TokenError {
    #[error("Missing bearer token")]
    Missing,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity of a verified token holder, attached to request extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub email: String,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    pub fn issue(&self, email: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Invalid(err.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default()).map_err(
            |err| {
                debug!(%err, "Token verification failed");
                TokenError::Invalid(err.to_string())
            },
        )?;
        Ok(Identity {
            email: data.claims.email,
        })
    }

    /// Verifies the value of an `Authorization: Bearer <token>` header.
    pub fn verify_header(&self, header: Option<&str>) -> Result<Identity, TokenError> {
        let header = header.ok_or(TokenError::Missing)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| TokenError::Invalid("Malformed authorization header".into()))?;
        self.verify(token.trim())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "test-secret-key-for-token-validation";

    #[test]
    fn test_issue_and_verify() {
        let tokens = TokenService::new(SECRET, Duration::hours(1));
        let token = tokens.issue("stefan@example.com").unwrap();

        let identity = tokens.verify(&token).unwrap();
        assert_eq!(identity.email, "stefan@example.com");

        let identity = tokens
            .verify_header(Some(&format!("Bearer {token}")))
            .unwrap();
        assert_eq!(identity.email, "stefan@example.com");
    }

    #[test]
    fn test_expired_token() {
        let tokens = TokenService::new(SECRET, Duration::hours(-2));
        let token = tokens.issue("stefan@example.com").unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_foreign_secret() {
        let foreign = TokenService::new("some-other-secret", Duration::hours(1));
        let token = foreign.issue("stefan@example.com").unwrap();

        let tokens = TokenService::new(SECRET, Duration::hours(1));
        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test_case::test_case (None, TokenError::Missing ; "missing header")]
    #[test_case::test_case (Some("Basic abc"), TokenError::Invalid("Malformed authorization header".into()) ; "wrong scheme")]
    fn test_verify_header_rejects(header: Option<&str>, expected: TokenError) {
        let tokens = TokenService::new(SECRET, Duration::hours(1));
        assert_eq!(tokens.verify_header(header), Err(expected));
    }

    #[test]
    fn test_garbage_token() {
        let tokens = TokenService::new(SECRET, Duration::hours(1));
        assert!(matches!(
            tokens.verify_header(Some("Bearer not.a.token")),
            Err(TokenError::Invalid(_))
        ));
    }
}
