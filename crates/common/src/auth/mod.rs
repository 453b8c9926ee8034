//! Authentication and authorization utilities
//!
//! Provides:
//! - JWT token generation and validation
//! - Group-based access control for staff endpoints

use crate::config::AuthConfig;
use crate::db::models::UserGroupName;
use crate::errors::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};

/// Groups allowed to administer the catalog
pub const ADMIN_ONLY: &[UserGroupName] = &[UserGroupName::Admin];

/// Groups allowed to moderate user content
pub const MODERATOR_ONLY: &[UserGroupName] = &[UserGroupName::Moderator];

/// Groups allowed to maintain catalog entries
pub const STAFF: &[UserGroupName] = &[UserGroupName::Admin, UserGroupName::Moderator];

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Authenticated user ID; tokens without one are rejected upstream
    #[serde(default)]
    pub user_id: Option<i32>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT token manager
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    expiration_secs: i64,
}

// The jsonwebtoken key types intentionally do not implement `Debug`, so a
// derive is impossible; format everything but the key material.
impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("algorithm", &self.algorithm)
            .field("expiration_secs", &self.expiration_secs)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Create a new JWT manager with the given secret
    pub fn new(secret: &str, algorithm: Algorithm, expiration_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            expiration_secs,
        }
    }

    /// Build a manager from configuration; the secret must be set
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let secret = config
            .jwt_secret
            .as_deref()
            .ok_or_else(|| AppError::Configuration {
                message: "auth.jwt_secret is not set".to_string(),
            })?;

        let algorithm = config
            .jwt_algorithm
            .parse::<Algorithm>()
            .map_err(|_| AppError::Configuration {
                message: format!("Unsupported JWT algorithm: {}", config.jwt_algorithm),
            })?;

        Ok(Self::new(secret, algorithm, config.jwt_expiration_secs as i64))
    }

    /// Generate a new JWT token for a user
    pub fn generate_token(&self, user_id: i32) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expiration_secs);

        let claims = TokenClaims {
            user_id: Some(user_id),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(|e| {
            AppError::Internal {
                message: format!("Failed to generate token: {}", e),
            }
        })
    }

    /// Validate and decode a JWT token
    pub fn decode_token(&self, token: &str) -> Result<TokenClaims> {
        decode::<TokenClaims>(token, &self.decoding_key, &Validation::new(self.algorithm))
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::Unauthorized {
                    message: "Invalid token".to_string(),
                },
            })
    }
}

/// Extract a bearer token from an Authorization header value
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Require the user's group to be in the allowed set
pub fn check_group(group: UserGroupName, allowed: &[UserGroupName]) -> Result<()> {
    if allowed.contains(&group) {
        return Ok(());
    }

    let names: Vec<String> = allowed.iter().map(|g| g.to_value()).collect();
    Err(AppError::Forbidden {
        message: format!("This action requires the {} group", names.join(" or ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JwtManager {
        JwtManager::new("test_secret", Algorithm::HS256, 3600)
    }

    #[test]
    fn test_jwt_roundtrip() {
        let token = manager().generate_token(7).unwrap();
        let claims = manager().decode_token(&token).unwrap();

        assert_eq!(claims.user_id, Some(7));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_rejected() {
        let expired = JwtManager::new("test_secret", Algorithm::HS256, -3600);

        let token = expired.generate_token(7).unwrap();
        let err = manager().decode_token(&token).unwrap_err();
        assert!(matches!(err, AppError::ExpiredToken));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let other = JwtManager::new("other_secret", Algorithm::HS256, 3600);

        let token = other.generate_token(7).unwrap();
        let err = manager().decode_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[test]
    fn test_token_without_user_id_decodes_to_none() {
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({ "exp": now + 600, "iat": now });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_secret"),
        )
        .unwrap();

        let decoded = manager().decode_token(&token).unwrap();
        assert_eq!(decoded.user_id, None);
    }

    #[test]
    fn test_from_config_requires_secret() {
        let config = AuthConfig {
            jwt_secret: None,
            ..Default::default()
        };

        let err = JwtManager::from_config(&config).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_from_config_rejects_unknown_algorithm() {
        let config = AuthConfig {
            jwt_secret: Some("secret".to_string()),
            jwt_algorithm: "ROT13".to_string(),
            ..Default::default()
        };

        let err = JwtManager::from_config(&config).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("abc.def.ghi"), None);
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_check_group_staff() {
        assert!(check_group(UserGroupName::Admin, STAFF).is_ok());
        assert!(check_group(UserGroupName::Moderator, STAFF).is_ok());

        let err = check_group(UserGroupName::User, STAFF).unwrap_err();
        match err {
            AppError::Forbidden { message } => {
                assert!(message.contains("ADMIN"));
                assert!(message.contains("MODERATOR"));
            }
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_check_group_admin_only() {
        assert!(check_group(UserGroupName::Admin, ADMIN_ONLY).is_ok());
        assert!(check_group(UserGroupName::Moderator, ADMIN_ONLY).is_err());
    }
}
