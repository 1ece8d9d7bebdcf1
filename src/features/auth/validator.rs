use super::model::{AuthenticatedUser, Claims};
use crate::core::config::AuthConfig;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use uuid::Uuid;

pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.jwt_leeway.as_secs();
        validation.validate_nbf = true;
        validation.validate_aud = false;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Unauthorized(e.to_string()))?;

        if header.alg != Algorithm::HS256 {
            return Err(AppError::Unauthorized(format!(
                "Unsupported algorithm: {:?}. Only HS256 is allowed",
                header.alg
            )));
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;

        let claims = token_data.claims;

        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Token subject is not a valid user id".to_string()))?;

        Ok(AuthenticatedUser {
            id,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{issue_token, TEST_JWT_SECRET};
    use std::time::Duration;

    fn config(issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            issuer: issuer.map(str::to_string),
            jwt_leeway: Duration::from_secs(0),
        }
    }

    #[test]
    fn test_valid_token_yields_user() {
        let validator = JwtValidator::new(&config(None));
        let id = Uuid::new_v4();
        let token = issue_token(id, "admin", 3600);

        let user = validator.validate_token(&token).unwrap();
        assert_eq!(user.id, id);
        assert!(user.is_admin());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let validator = JwtValidator::new(&config(None));
        let token = issue_token(Uuid::new_v4(), "customer", -3600);

        let err = validator.validate_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let validator = JwtValidator::new(&config(Some("https://id.example.com")));
        let token = issue_token(Uuid::new_v4(), "customer", 3600);

        assert!(validator.validate_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let validator = JwtValidator::new(&config(None));
        assert!(validator.validate_token("not-a-token").is_err());
    }
}
