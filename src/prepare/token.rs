//! Descriptor signing
//!
//! Tokens are HS256 JWTs whose claims are the descriptor itself, minus the
//! `token` field. Claims are serialized with sorted keys and carry no
//! time-varying fields, so the same descriptor always yields the same token
//! and verifiers can recompute it.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};

use super::descriptor::SessionDescriptor;
use crate::types::{PrepareError, Result};

/// Minimum accepted secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Wire name of the signature field, excluded from the signed payload
const TOKEN_FIELD: &str = "token";

/// Signs descriptors with a shared secret
#[derive(Clone)]
pub struct TokenSigner {
    secret: String,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// Create a signer
    ///
    /// Returns an error if the secret is empty or too short
    pub fn new(secret: String) -> Result<Self> {
        if secret.is_empty() {
            return Err(PrepareError::Signing(
                "signing is enabled but no secret is configured".into(),
            ));
        }

        if secret.len() < MIN_SECRET_LEN {
            return Err(PrepareError::Signing(format!(
                "signing secret must be at least {} characters",
                MIN_SECRET_LEN
            )));
        }

        Ok(Self { secret })
    }

    /// Build the optional signer from deployment settings.
    ///
    /// Disabled signing yields `None`; enabled signing without a usable
    /// secret is an error.
    pub fn from_settings(enabled: bool, secret: Option<String>) -> Result<Option<Self>> {
        if !enabled {
            return Ok(None);
        }
        Self::new(secret.unwrap_or_default()).map(Some)
    }

    /// Produce the token for a descriptor. Any existing signature is ignored.
    pub fn sign(&self, descriptor: &SessionDescriptor) -> Result<String> {
        let claims = canonical_claims(descriptor)?;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Sign and embed the token. The descriptor is consumed so a caller
    /// never holds a half-signed copy.
    pub fn sign_into(&self, mut descriptor: SessionDescriptor) -> Result<SessionDescriptor> {
        let token = self.sign(&descriptor)?;
        descriptor.signature = Some(token);
        Ok(descriptor)
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Value> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        let data = decode::<Value>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }

    /// Check that `descriptor` carries a token matching its own content
    pub fn verify_descriptor(&self, descriptor: &SessionDescriptor) -> Result<bool> {
        let Some(token) = descriptor.signature.as_deref() else {
            return Ok(false);
        };
        let claims = match self.verify(token) {
            Ok(claims) => claims,
            Err(_) => return Ok(false),
        };
        Ok(claims == canonical_claims(descriptor)?)
    }
}

/// Descriptor as a JSON value with sorted keys and no signature
pub fn canonical_claims(descriptor: &SessionDescriptor) -> Result<Value> {
    let mut value = serde_json::to_value(descriptor)
        .map_err(|e| PrepareError::Signing(format!("Unable to serialize descriptor: {}", e)))?;
    if let Value::Object(ref mut map) = value {
        map.remove(TOKEN_FIELD);
    }
    Ok(canonicalize(value))
}

/// Rebuild every object with its keys in sorted order
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
