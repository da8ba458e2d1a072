//! Token verification
//!
//! Wraps the `jsonwebtoken` collaborator: key material is loaded once, the
//! algorithm allow-list is pinned, and every decode failure is classified
//! into an [`AuthFailure`] so callers never see raw library errors.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{GateError, Result};

/// Default clock-skew tolerance in seconds when validating `exp`.
const DEFAULT_LEEWAY_SECS: u64 = 5;

/// A verified credential: the raw compact token plus its decoded claims.
///
/// Claims are kept as an opaque JSON map; the gate imposes no claim schema.
#[derive(Debug, Clone)]
pub struct DecodedToken {
    raw: String,
    claims: Map<String, Value>,
}

impl DecodedToken {
    /// The compact token string this credential was decoded from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// All claims carried by the token.
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// A single claim by name.
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Deserialize the claims into a caller-defined type.
    pub fn claims_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.claims.clone()))
    }
}

/// Why an authentication attempt was rejected.
///
/// Every variant that saw a token keeps the raw string for diagnostic
/// logging. The signing key never appears here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// No configured location produced a token.
    NotFound,
    /// The located value is not a parseable JWT.
    Malformed(String),
    /// The token parsed but its signature or structure did not verify.
    Unverified(String),
    /// The token verified but its expiry is in the past.
    Expired(String),
}

impl AuthFailure {
    /// The raw token behind this failure, when one was located.
    pub fn token(&self) -> Option<&str> {
        match self {
            AuthFailure::NotFound => None,
            AuthFailure::Malformed(raw)
            | AuthFailure::Unverified(raw)
            | AuthFailure::Expired(raw) => Some(raw),
        }
    }
}

/// JWT verifier with pinned key material and a restricted algorithm
/// allow-list. `jsonwebtoken` has no `none` algorithm, and any token signed
/// with an algorithm outside the list is rejected as unverified.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    algorithms: Vec<Algorithm>,
    leeway: u64,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.algorithms)
            .field("leeway", &self.leeway)
            .finish()
    }
}

impl TokenVerifier {
    /// Verifier for HMAC-signed tokens. Allow-list defaults to `HS256`.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            algorithms: vec![Algorithm::HS256],
            leeway: DEFAULT_LEEWAY_SECS,
        }
    }

    /// Verifier for RSA-signed tokens from a PEM-encoded public key.
    /// Allow-list defaults to `RS256`.
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(pem).map_err(GateError::Key)?;
        Ok(Self {
            decoding_key,
            algorithms: vec![Algorithm::RS256],
            leeway: DEFAULT_LEEWAY_SECS,
        })
    }

    /// Replace the algorithm allow-list. All entries must share the key
    /// family of the loaded key material.
    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    /// Replace the clock-skew tolerance for expiry validation.
    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.leeway = secs;
        self
    }

    /// Validation with the pinned allow-list and a strict leeway. Claims
    /// beyond `exp` are opaque to the gate: audience and issuer policy
    /// belongs to hooks or downstream handlers.
    fn validation(&self) -> Validation {
        let base = self.algorithms.first().copied().unwrap_or(Algorithm::HS256);
        let mut validation = Validation::new(base);
        validation.algorithms = self.algorithms.clone();
        validation.leeway = self.leeway;
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = Default::default();
        validation
    }

    /// Verify a compact JWT and classify the outcome.
    pub fn verify(&self, token: &str) -> std::result::Result<DecodedToken, AuthFailure> {
        use jsonwebtoken::errors::ErrorKind;

        match decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation()) {
            Ok(data) => Ok(DecodedToken {
                raw: token.to_string(),
                claims: data.claims,
            }),
            Err(err) => Err(match err.kind() {
                // Signature checks run before claim checks, so an expired
                // verdict means the signature itself was valid.
                ErrorKind::ExpiredSignature => AuthFailure::Expired(token.to_string()),
                ErrorKind::InvalidToken
                | ErrorKind::InvalidAlgorithmName
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => AuthFailure::Malformed(token.to_string()),
                _ => AuthFailure::Unverified(token.to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &[u8] = b"test-secret-key-for-testing-purposes-only";

    fn mint(claims: &Value, algorithm: Algorithm) -> String {
        encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::from_secret(SECRET)
    }

    #[test]
    fn test_verify_valid_token() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = mint(
            &json!({ "iss": "Acme Toothpicks Ltd", "exp": exp, "uid": 1 }),
            Algorithm::HS256,
        );

        let decoded = verifier().verify(&token).unwrap();

        assert_eq!(decoded.raw(), token);
        assert_eq!(
            decoded.claim("iss").and_then(Value::as_str),
            Some("Acme Toothpicks Ltd")
        );
        assert_eq!(decoded.claim("uid").and_then(Value::as_i64), Some(1));
    }

    #[test]
    fn test_expired_token_is_never_a_success() {
        let exp = (Utc::now() - Duration::hours(1)).timestamp();
        let token = mint(&json!({ "iss": "Acme", "exp": exp }), Algorithm::HS256);

        let failure = verifier().verify(&token).unwrap_err();

        assert_eq!(failure, AuthFailure::Expired(token));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let failure = verifier().verify("not-a-jwt").unwrap_err();
        assert_eq!(failure, AuthFailure::Malformed("not-a-jwt".to_string()));
    }

    #[test]
    fn test_tampered_signature_is_unverified() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = mint(&json!({ "exp": exp }), Algorithm::HS256);
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
        let tampered = parts.join(".");

        let failure = verifier().verify(&tampered).unwrap_err();

        assert_eq!(failure, AuthFailure::Unverified(tampered));
    }

    #[test]
    fn test_algorithm_outside_allow_list_is_unverified() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = mint(&json!({ "exp": exp }), Algorithm::HS384);

        let failure = verifier().verify(&token).unwrap_err();

        assert_eq!(failure, AuthFailure::Unverified(token));
    }

    #[test]
    fn test_no_claim_schema_is_imposed() {
        // No exp, no iss, no aud: still a valid credential for the gate.
        let token = mint(&json!({ "uid": 42 }), Algorithm::HS256);

        let decoded = verifier().verify(&token).unwrap();

        assert_eq!(decoded.claim("uid").and_then(Value::as_i64), Some(42));
    }

    #[test]
    fn test_claims_as_typed() {
        #[derive(serde::Deserialize)]
        struct Claims {
            iss: String,
            uid: i64,
        }

        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = mint(&json!({ "iss": "Acme", "exp": exp, "uid": 7 }), Algorithm::HS256);

        let decoded = verifier().verify(&token).unwrap();
        let claims: Claims = decoded.claims_as().unwrap();

        assert_eq!(claims.iss, "Acme");
        assert_eq!(claims.uid, 7);
    }

    #[test]
    fn test_failure_keeps_raw_token() {
        let failure = AuthFailure::Expired("abc".to_string());
        assert_eq!(failure.token(), Some("abc"));
        assert_eq!(AuthFailure::NotFound.token(), None);
    }

    #[test]
    fn test_debug_does_not_print_key_material() {
        let debug = format!("{:?}", verifier());
        assert!(!debug.contains("test-secret"));
        assert!(debug.contains("HS256"));
    }
}
