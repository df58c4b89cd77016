//! Access token issuing and verification (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::error::ApiError;

/// Token signing settings.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC signing secret.
    pub secret: String,
    /// Token lifetime in seconds.
    pub expires_in_secs: i64,
    /// `iss` claim.
    pub issuer: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("expires_in_secs", &self.expires_in_secs)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

/// Access token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// User email at issue time.
    pub email: String,
    /// Unique token id, used for revocation on logout.
    pub jti: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
    /// Issuer.
    pub iss: String,
}

/// A verified access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedToken {
    /// Token owner.
    pub user_id: UserId,
    /// Token id.
    pub jti: uuid::Uuid,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

/// A freshly issued access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded JWT.
    pub token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// Signs and verifies access tokens.
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Creates a manager from the given settings.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issues a token for the given user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] if encoding fails.
    pub fn issue(&self, user_id: UserId, email: &str) -> Result<IssuedToken, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.expires_in_secs);
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("token encoding failed: {e}")))?;

        Ok(IssuedToken {
            token,
            expires_in: self.config.expires_in_secs,
        })
    }

    /// Verifies signature, issuer and expiry of a token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for any invalid token.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, ApiError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            ApiError::Unauthorized
        })?;

        let claims = data.claims;
        let user_id = claims.sub.parse().map_err(|_| ApiError::Unauthorized)?;
        let jti = uuid::Uuid::parse_str(&claims.jti).map_err(|_| ApiError::Unauthorized)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(ApiError::Unauthorized)?;

        Ok(VerifiedToken {
            user_id,
            jti,
            expires_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn manager(issuer: &str) -> JwtManager {
        JwtManager::new(JwtConfig {
            secret: "test-secret".into(),
            expires_in_secs: 60,
            issuer: issuer.into(),
        })
    }

    #[test]
    fn issue_and_verify() {
        let jwt = manager("zorvexra-api");
        let user = UserId::new();
        let Ok(issued) = jwt.issue(user, "ada@example.com") else {
            panic!("issue failed");
        };
        assert_eq!(issued.expires_in, 60);
        let Ok(verified) = jwt.verify(&issued.token) else {
            panic!("verify failed");
        };
        assert_eq!(verified.user_id, user);
        assert!(verified.expires_at > Utc::now());
    }

    #[test]
    fn each_token_has_a_fresh_jti() {
        let jwt = manager("zorvexra-api");
        let user = UserId::new();
        let (Ok(a), Ok(b)) = (jwt.issue(user, "a@b.c"), jwt.issue(user, "a@b.c")) else {
            panic!("issue failed");
        };
        let (Ok(a), Ok(b)) = (jwt.verify(&a.token), jwt.verify(&b.token)) else {
            panic!("verify failed");
        };
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn rejects_garbage_and_foreign_issuer() {
        let jwt = manager("zorvexra-api");
        assert!(matches!(
            jwt.verify("invalid.token.here"),
            Err(ApiError::Unauthorized)
        ));

        let Ok(foreign) = manager("someone-else").issue(UserId::new(), "a@b.c") else {
            panic!("issue failed");
        };
        assert!(jwt.verify(&foreign.token).is_err());
    }
}
