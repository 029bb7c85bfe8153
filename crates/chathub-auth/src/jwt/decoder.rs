//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use chathub_core::config::AuthConfig;
use chathub_core::error::AppError;

use super::claims::Claims;

/// Validates bearer tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes a token, checking signature and expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                _ => AppError::authentication(format!("Token validation failed: {e}")),
            })
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use chathub_core::error::ErrorKind;

    use super::*;
    use crate::jwt::JwtEncoder;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_issue_then_decode() {
        let config = config("test-secret");
        let user_id = Uuid::new_v4();
        let token = JwtEncoder::new(&config)
            .issue(user_id, "ada@example.com")
            .unwrap();

        let claims = JwtDecoder::new(&config).decode(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "ada@example.com");
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtEncoder::new(&config("one"))
            .issue(Uuid::new_v4(), "a@example.com")
            .unwrap();
        let err = JwtDecoder::new(&config("two")).decode(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_garbage_rejected() {
        let err = JwtDecoder::new(&config("s")).decode("not.a.jwt").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
}
