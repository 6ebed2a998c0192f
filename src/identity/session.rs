use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::principal::Principal;
use crate::error::{AppError, AppResult};

pub const TEACHER_ROLE: &str = "teacher";

/// Environment variable supplying the token signing secret.
pub const SECRET_ENV: &str = "ADMIN_JWT_SECRET";
const DEV_SECRET: &str = "dev-secret-change-me";

/// Signed claim set carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
}

impl Claims {
    pub fn new(username: &str, ttl: Duration) -> Self {
        Self {
            sub: username.to_string(),
            role: TEACHER_ROLE.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        }
    }

    /// A token is valid strictly before its expiry instant.
    pub fn expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }
}

/// Issues and verifies stateless HS256-signed session tokens.
///
/// Verification needs nothing but the shared secret and the clock; there is
/// no session table and no revocation. A leaked token stays valid until it
/// expires, which the 12-hour default ttl bounds.
pub struct SessionAuthority {
    pub ttl: Duration,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionAuthority {
    pub fn new(secret: &str) -> Self {
        Self {
            ttl: Duration::hours(12),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Read the signing secret from the environment, falling back to a fixed
    /// development secret that is unsuitable for production deployments.
    pub fn from_env() -> Self {
        match std::env::var(SECRET_ENV) {
            Ok(secret) => Self::new(&secret),
            Err(_) => {
                warn!("{} not set; using the insecure development secret", SECRET_ENV);
                Self::new(DEV_SECRET)
            }
        }
    }

    /// Produce a token for `username`. Callers must have confirmed the
    /// credentials first; issuance itself performs no checks.
    pub fn issue(&self, username: &str) -> AppResult<String> {
        let claims = Claims::new(username, self.ttl);
        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::internal("token_encode_failed", e.to_string()))?;
        debug!(target: "identity", "session.issue user={} ttl_secs={}", username, self.ttl.num_seconds());
        Ok(token)
    }

    /// Check signature and expiry, then the role claim.
    pub fn verify(&self, token: &str) -> AppResult<Principal> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| AppError::unauthenticated("invalid_token", "Invalid token"))?;
        let claims = data.claims;
        if claims.expired() {
            return Err(AppError::unauthenticated("invalid_token", "Invalid token"));
        }
        if claims.role != TEACHER_ROLE {
            return Err(AppError::forbidden("wrong_role", "Forbidden: teacher role required"));
        }
        Ok(Principal { username: claims.sub, role: claims.role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn issue_then_verify_round_trips() {
        let authority = SessionAuthority::new(SECRET);
        let token = authority.issue("mrodriguez").unwrap();
        let principal = authority.verify(&token).unwrap();
        assert_eq!(principal.username, "mrodriguez");
        assert_eq!(principal.role, TEACHER_ROLE);
    }

    #[test]
    fn expired_token_is_unauthenticated() {
        let mut authority = SessionAuthority::new(SECRET);
        authority.ttl = Duration::hours(-1);
        let token = authority.issue("mrodriguez").unwrap();
        let err = authority.verify(&token).unwrap_err();
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn foreign_signature_is_unauthenticated() {
        let issuer = SessionAuthority::new("some-other-secret");
        let token = issuer.issue("mrodriguez").unwrap();
        let authority = SessionAuthority::new(SECRET);
        let err = authority.verify(&token).unwrap_err();
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn garbage_token_is_unauthenticated() {
        let authority = SessionAuthority::new(SECRET);
        let err = authority.verify("not-a-token").unwrap_err();
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn wrong_role_is_forbidden() {
        let authority = SessionAuthority::new(SECRET);
        let claims = Claims {
            sub: "intruder".to_string(),
            role: "student".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let err = authority.verify(&token).unwrap_err();
        assert_eq!(err.http_status(), 403);
    }
}
