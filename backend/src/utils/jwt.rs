//! Session token issuance and verification.
//!
//! Verification runs in two phases. [`precheck`] is a cheap structural and
//! expiry inspection of the raw token; only tokens that pass it reach the
//! HS256 signature check. The result of a successful verification is a
//! [`Principal`], which is what the rest of the request sees.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::auth::role::Role;
use crate::config::Config;
use crate::database::models::Admin;
use crate::errors::{ServiceError, ServiceResult};

/// JWT claims carried by a session token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Admin ID
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Issued at, epoch seconds
    pub iat: i64,
    /// Expiry, epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// The verified identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// What the structural pre-check learns from an unverified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPreview {
    pub subject: String,
    pub expires_at: Option<i64>,
}

/// Inspects a token without checking its signature.
///
/// Returns `None` unless the token has three non-empty dot-separated
/// segments, the middle one decodes to a JSON object with a string `sub`,
/// and any `exp` is a number not earlier than `now`.
pub fn precheck(token: &str, now: i64) -> Option<TokenPreview> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next().filter(|s| !s.is_empty()),
        segments.next().filter(|s| !s.is_empty()),
        segments.next().filter(|s| !s.is_empty()),
        segments.next(),
    ) else {
        return None;
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let object = claims.as_object()?;

    let subject = object
        .get("sub")
        .and_then(|sub| sub.as_str())
        .filter(|sub| !sub.is_empty())?
        .to_string();

    let expires_at = match object.get("exp") {
        None | Some(serde_json::Value::Null) => None,
        Some(exp) => Some(exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?),
    };

    if matches!(expires_at, Some(exp) if exp < now) {
        return None;
    }

    Some(TokenPreview {
        subject,
        expires_at,
    })
}

/// JWT token utility for creating and validating tokens
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expires_in_seconds: u64,
}

impl JwtUtils {
    pub fn new(secret: &str, expires_in_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub"]);

        JwtUtils {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expires_in_seconds,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expires_in_seconds)
    }

    pub fn expires_in(&self) -> u64 {
        self.expires_in_seconds
    }

    /// Issue a session token for an admin
    pub fn generate_token(&self, admin: &Admin) -> ServiceResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expires_in_seconds as i64);

        let claims = Claims {
            sub: admin.id.clone(),
            email: admin.email.clone(),
            role: admin.role,
            iat: now.timestamp(),
            exp: Some(exp.timestamp()),
        };

        self.encode_claims(&claims)
    }

    pub(crate) fn encode_claims(&self, claims: &Claims) -> ServiceResult<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal_error(format!("Token generation failed: {}", e)))
    }

    /// Resolve a raw token to a principal, or `None` when the token is
    /// malformed, expired, forged, or names an unknown role.
    pub fn verify(&self, token: &str) -> Option<Principal> {
        let preview = precheck(token, Utc::now().timestamp())?;

        let claims = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!("Token for {} rejected: {}", preview.subject, e);
                return None;
            }
        };

        Some(Principal::from(claims))
    }
}
