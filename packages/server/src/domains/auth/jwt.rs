use anyhow::Result;
use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::MembershipId;
use crate::domains::membership::Role;

/// How long an API bearer token lasts
const SESSION_TTL_HOURS: i64 = 24;

/// JWT Claims - data stored in the token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,                 // Subject (membership_id as string)
    pub membership_id: MembershipId, // Membership UUID
    pub role: Role,                  // Member or agent
    pub exp: i64,                    // Expiration timestamp
    pub iat: i64,                    // Issued at timestamp
    pub iss: String,                 // Issuer
    pub jti: String,                 // JWT ID (unique token identifier)
}

/// JWT Service - creates and verifies API bearer tokens
///
/// These authenticate callers of the HTTP API. They are unrelated to pass
/// tokens, which are single-use and live on the membership record.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    /// Create new JWT service with secret and issuer
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Create a bearer token for a membership
    ///
    /// Token expires after 24 hours
    pub fn create_token(&self, membership_id: MembershipId, role: Role) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + Duration::hours(SESSION_TTL_HOURS);

        let claims = Claims {
            sub: membership_id.to_string(),
            membership_id,
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a bearer token
    ///
    /// Returns claims if token is valid and not expired
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}
