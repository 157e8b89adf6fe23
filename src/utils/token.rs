use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::middleware::auth::{Claims, TokenKind};

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub fn issue_token(account_id: Uuid, kind: TokenKind, secret: &str, ttl: Duration) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: account_id.to_string(),
        exp: (now + ttl).timestamp() as usize,
        iat: now.timestamp() as usize,
        token_type: kind,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token generation failed: {}", e)))
}

pub fn issue_token_pair(
    account_id: Uuid,
    secret: &str,
    access_ttl: Duration,
    refresh_ttl: Duration,
) -> Result<TokenPair> {
    Ok(TokenPair {
        access: issue_token(account_id, TokenKind::Access, secret, access_ttl)?,
        refresh: issue_token(account_id, TokenKind::Refresh, secret, refresh_ttl)?,
    })
}

/// Decodes and checks signature, expiry and token kind.
pub fn decode_token(token: &str, secret: &str, expected: TokenKind) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| Error::Unauthorized("invalid_token".to_string()))?;

    if data.claims.token_type != expected {
        return Err(Error::Unauthorized("wrong_token_type".to_string()));
    }
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn access_token_round_trips_account_id() {
        let id = Uuid::new_v4();
        let pair = issue_token_pair(id, SECRET, Duration::minutes(5), Duration::days(1)).unwrap();
        let claims = decode_token(&pair.access, SECRET, TokenKind::Access).unwrap();
        assert_eq!(claims.account_id().unwrap(), id);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let pair =
            issue_token_pair(Uuid::new_v4(), SECRET, Duration::minutes(5), Duration::days(1))
                .unwrap();
        assert!(decode_token(&pair.refresh, SECRET, TokenKind::Access).is_err());
        assert!(decode_token(&pair.refresh, SECRET, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn expired_or_foreign_tokens_are_rejected() {
        let id = Uuid::new_v4();
        let expired = issue_token(id, TokenKind::Access, SECRET, Duration::hours(-2)).unwrap();
        assert!(decode_token(&expired, SECRET, TokenKind::Access).is_err());

        let foreign = issue_token(id, TokenKind::Access, "other-secret", Duration::hours(1)).unwrap();
        assert!(decode_token(&foreign, SECRET, TokenKind::Access).is_err());
    }
}
