use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Owner;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid signature")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("HMAC computation failed: {0}")]
    HmacError(String),
}

#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
}

/// Claims the journal relies on. Other claims issued by the auth backend
/// are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Verifies HS256 access tokens issued by the managed auth backend.
#[derive(Clone)]
pub struct AccessTokenVerifier {
    secret: Vec<u8>,
}

impl AccessTokenVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, signing_input: &str) -> Result<HmacSha256, TokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| TokenError::HmacError(e.to_string()))?;
        mac.update(signing_input.as_bytes());
        Ok(mac)
    }

    /// Check signature and expiry, returning the caller's identity.
    ///
    /// `now` is seconds since the Unix epoch.
    pub fn verify(&self, token: &str, now: i64) -> Result<Owner, TokenError> {
        let (signing_input, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (header, payload) = signing_input.split_once('.').ok_or(TokenError::Malformed)?;
        if payload.contains('.') {
            return Err(TokenError::Malformed);
        }

        let header: Header = decode_segment(header)?;
        if header.alg != "HS256" {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let signature = BASE64_URL
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        self.mac(signing_input)?
            .verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = decode_segment(payload)?;
        // `exp` is mandatory.
        match claims.exp {
            Some(exp) if exp > now => {}
            Some(_) => return Err(TokenError::Expired),
            None => return Err(TokenError::Malformed),
        }

        Ok(Owner(claims.sub))
    }

    /// Mint a token for the given claims. Used by local tooling and tests.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = BASE64_URL.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;
        let signing_input = format!("{header}.{}", BASE64_URL.encode(payload));
        let signature = BASE64_URL.encode(self.mac(&signing_input)?.finalize().into_bytes());
        Ok(format!("{signing_input}.{signature}"))
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = BASE64_URL.decode(segment).map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_790_000_000;

    fn claims(exp: Option<i64>) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            exp,
            email: None,
        }
    }

    #[test]
    fn verify_accepts_signed_token() {
        let verifier = AccessTokenVerifier::new("super-secret");
        let c = claims(Some(NOW + 3600));
        let token = verifier.sign(&c).unwrap();

        assert_eq!(verifier.verify(&token, NOW), Ok(Owner(c.sub)));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = AccessTokenVerifier::new("one").sign(&claims(None)).unwrap();
        let result = AccessTokenVerifier::new("two").verify(&token, NOW);
        assert_eq!(result, Err(TokenError::BadSignature));
    }

    #[test]
    fn verify_rejects_expired() {
        let verifier = AccessTokenVerifier::new("super-secret");
        let token = verifier.sign(&claims(Some(NOW - 1))).unwrap();
        assert_eq!(verifier.verify(&token, NOW), Err(TokenError::Expired));
    }

    #[test]
    fn verify_rejects_token_without_expiry() {
        let verifier = AccessTokenVerifier::new("super-secret");
        let token = verifier.sign(&claims(None)).unwrap();
        assert_eq!(verifier.verify(&token, NOW), Err(TokenError::Malformed));
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let verifier = AccessTokenVerifier::new("super-secret");
        let token = verifier.sign(&claims(None)).unwrap();
        let forged_payload = BASE64_URL.encode(serde_json::to_vec(&claims(None)).unwrap());

        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert_eq!(verifier.verify(&forged, NOW), Err(TokenError::BadSignature));
    }

    #[test]
    fn verify_rejects_other_algorithms_and_garbage() {
        let verifier = AccessTokenVerifier::new("super-secret");
        let header = BASE64_URL.encode(br#"{"alg":"none"}"#);
        let payload = BASE64_URL.encode(serde_json::to_vec(&claims(None)).unwrap());
        let unsigned = format!("{header}.{payload}.");

        assert_eq!(
            verifier.verify(&unsigned, NOW),
            Err(TokenError::UnsupportedAlgorithm("none".into()))
        );
        assert_eq!(verifier.verify("not-a-token", NOW), Err(TokenError::Malformed));
        assert_eq!(verifier.verify("a.b.c.d", NOW), Err(TokenError::Malformed));
    }
}
