use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::user::User;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) is_admin: bool,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

/// Signed access token with its lifetime in seconds.
#[derive(Debug, Clone)]
pub(crate) struct IssuedToken {
    pub(crate) token: String,
    pub(crate) expires_in: i64,
}

#[derive(Clone)]
pub(crate) struct JwtService {
    secret: String,
    ttl_seconds: i64,
}

impl JwtService {
    const DEFAULT_TTL_SECONDS: i64 = 24 * 60 * 60;

    pub(crate) fn new(secret: &str, ttl_seconds: i64) -> Self {
        let ttl_seconds = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            Self::DEFAULT_TTL_SECONDS
        };

        JwtService {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    pub(crate) fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub(crate) fn issue(&self, user: &User) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_seconds)).timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(JwtError::Encode)?;

        Ok(IssuedToken {
            token,
            expires_in: self.ttl_seconds,
        })
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 10;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(JwtError::Decode)?;

        Ok(token_data.claims)
    }
}
