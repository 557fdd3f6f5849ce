//! Request signing for the verification provider API.
//!
//! Every request to the provider carries an `X-App-Access-Sig` header: the
//! lowercase hex HMAC-SHA256 of `timestamp || METHOD || path || body`, keyed
//! with the shared secret. The path includes the query string and the body is
//! the exact serialized payload sent on the wire (empty for bodiless requests).

use std::fmt;

use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Errors raised while building a signer
#[derive(Debug, Error)]
pub enum SignerError {
    /// No secret key was configured
    #[error("Secret key is not configured")]
    MissingSecret,

    /// The secret key was rejected by the MAC implementation
    #[error("Invalid secret key: {0}")]
    InvalidSecret(String),
}

/// Signs provider requests with the shared secret key.
///
/// The secret is only held as an initialized MAC state and never rendered.
#[derive(Clone)]
pub struct RequestSigner {
    mac: HmacSha256,
}

impl RequestSigner {
    /// Creates a signer for the given secret key
    ///
    /// # Errors
    ///
    /// Returns `SignerError::MissingSecret` if the secret is empty
    pub fn new(secret_key: &str) -> Result<Self, SignerError> {
        if secret_key.is_empty() {
            return Err(SignerError::MissingSecret);
        }

        let mac = HmacSha256::new_from_slice(secret_key.as_bytes())
            .map_err(|e| SignerError::InvalidSecret(e.to_string()))?;

        Ok(Self { mac })
    }

    /// Computes the signature for one request
    ///
    /// `timestamp` is in unix seconds and must be the same value sent in
    /// `X-App-Access-Ts`.
    #[must_use]
    pub fn sign(&self, timestamp: i64, method: &Method, path: &str, body: &[u8]) -> String {
        let mut mac = self.mac.clone();

        mac.update(timestamp.to_string().as_bytes());
        mac.update(method.as_str().to_uppercase().as_bytes());
        mac.update(path.as_bytes());
        mac.update(body);

        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";
    const TS: i64 = 1_700_000_000;

    fn signer() -> RequestSigner {
        RequestSigner::new(SECRET).unwrap()
    }

    #[test]
    fn test_known_vector_with_body() {
        let signature = signer().sign(
            TS,
            &Method::POST,
            "/resources/accessTokens/sdk",
            br#"{"userId":"u1"}"#,
        );

        assert_eq!(
            signature,
            "2caf3d908ab99d3c2b1079724427c293c6253d7e307dbe1aa1afd988cf494a16"
        );
    }

    #[test]
    fn test_known_vector_without_body() {
        let signature = signer().sign(TS, &Method::GET, "/resources/applicants/abc/one", b"");

        assert_eq!(
            signature,
            "c4c72f8788164713b742e46bdded665daa8db66d971088608732fd7e95f46f2b"
        );
    }

    #[test]
    fn test_signature_is_deterministic() {
        let first = signer().sign(TS, &Method::POST, "/resources/applicants?levelName=x", b"{}");
        let second = signer().sign(TS, &Method::POST, "/resources/applicants?levelName=x", b"{}");

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_each_input_changes_signature() {
        let signer = signer();
        let base = signer.sign(TS, &Method::POST, "/resources/applicants", b"{}");

        assert_ne!(base, signer.sign(TS + 1, &Method::POST, "/resources/applicants", b"{}"));
        assert_ne!(base, signer.sign(TS, &Method::GET, "/resources/applicants", b"{}"));
        assert_ne!(base, signer.sign(TS, &Method::POST, "/resources/applicant", b"{}"));
        assert_ne!(base, signer.sign(TS, &Method::POST, "/resources/applicants", b"{ }"));

        let other_secret = RequestSigner::new("other-secret").unwrap();
        assert_ne!(
            base,
            other_secret.sign(TS, &Method::POST, "/resources/applicants", b"{}")
        );
    }

    #[test]
    fn test_query_string_is_signed() {
        let signer = signer();

        assert_ne!(
            signer.sign(TS, &Method::POST, "/resources/applicants?levelName=a", b""),
            signer.sign(TS, &Method::POST, "/resources/applicants?levelName=b", b""),
        );
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(matches!(
            RequestSigner::new(""),
            Err(SignerError::MissingSecret)
        ));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let debug = format!("{:?}", signer());
        assert!(!debug.contains(SECRET));
    }
}
