//! HS256 access tokens.
//!
//! A token carries the user id and role name in its [`Claims`]; handlers
//! trust those two values verbatim once the signature and expiry check out.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use roofdesk_core::roles::Role;
use roofdesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's internal database id.
    pub sub: DbId,
    /// Role name as stored on the user row (`"CLIENT"`, `"ADMIN"`, `"DEVELOPER"`).
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    /// Unique token identifier (UUID v4), logged for audit.
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `JWT_SECRET`             | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS` | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    /// Token lifetime in seconds, as reported to clients.
    pub fn expires_in(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }
}

/// Generate an HS256 access token for the given user.
pub fn generate_access_token(
    user_id: DbId,
    role: Role,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user_id,
        role: role.as_str().to_string(),
        exp: now + config.expires_in(),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token. Checks signature and `exp`.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "roof-test-secret-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        }
    }

    #[test]
    fn generated_token_round_trips_claims() {
        let config = test_config();
        let token = generate_access_token(42, Role::Admin, &config).unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "ADMIN");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn expired_token_fails() {
        let config = test_config();

        // Past the default 60-second leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            role: "CLIENT".to_string(),
            exp: now - 300,
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn token_from_other_secret_fails() {
        let other = JwtConfig {
            secret: "a-different-secret".to_string(),
            access_token_expiry_mins: 60,
        };
        let token = generate_access_token(1, Role::Client, &other).unwrap();
        assert!(validate_token(&token, &test_config()).is_err());
    }
}
