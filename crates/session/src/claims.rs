//! Claims embedded in the bearer token

use std::collections::HashSet;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// The subset of JWT claims the client relies on.
///
/// Tokens are decoded without verifying the signature: the server is the
/// authority on validity, the client only needs the expiry to schedule
/// logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiry as a Unix timestamp in seconds
    #[serde(deserialize_with = "numeric_date")]
    pub exp: i64,
}

/// NumericDate may carry a fractional part; whole seconds are enough here.
fn numeric_date<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(de::Error::custom("exp is not a finite number"));
    }
    Ok(value.floor() as i64)
}

impl TokenClaims {
    /// Decode the claims of `token`. Fails when the token is malformed or
    /// carries no `exp` claim.
    pub fn decode(token: &str) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
        Ok(data.claims)
    }

    /// Expiry in Unix milliseconds
    pub fn expires_at_ms(&self) -> i64 {
        self.exp.saturating_mul(1000)
    }

    /// Milliseconds left until expiry, negative once expired
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        self.expires_at_ms() - now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn token(claims: serde_json::Value, alg: Algorithm) -> String {
        encode(
            &Header::new(alg),
            &claims,
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_reads_exp_without_secret() {
        let t = token(json!({"sub": "u1", "exp": 1_700_000_600}), Algorithm::HS256);
        let claims = TokenClaims::decode(&t).unwrap();
        assert_eq!(claims.exp, 1_700_000_600);
        assert_eq!(claims.remaining_ms(1_700_000_000_000), 600_000);
    }

    #[test]
    fn test_decode_floors_fractional_exp() {
        let t = token(json!({"exp": 1_700_000_600.5}), Algorithm::HS256);
        let claims = TokenClaims::decode(&t).unwrap();
        assert_eq!(claims.exp, 1_700_000_600);
        assert_eq!(claims.remaining_ms(1_700_000_000_000), 600_000);
    }

    #[test]
    fn test_decode_rejects_non_numeric_exp() {
        let t = token(json!({"exp": "tomorrow"}), Algorithm::HS256);
        assert!(TokenClaims::decode(&t).is_err());
    }

    #[test]
    fn test_decode_ignores_algorithm() {
        let t = token(json!({"exp": 1_700_000_600}), Algorithm::HS512);
        assert!(TokenClaims::decode(&t).is_ok());
    }

    #[test]
    fn test_decode_accepts_expired_token() {
        let t = token(json!({"exp": 10}), Algorithm::HS256);
        let claims = TokenClaims::decode(&t).unwrap();
        assert!(claims.remaining_ms(1_000_000) < 0);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(TokenClaims::decode("not-a-jwt").is_err());
        assert!(TokenClaims::decode("a.b.c").is_err());
        assert!(TokenClaims::decode("").is_err());
    }

    #[test]
    fn test_decode_requires_exp() {
        let t = token(json!({"sub": "u1"}), Algorithm::HS256);
        assert!(TokenClaims::decode(&t).is_err());
    }
}
