use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{config::Config, errors::AppError, AppState};

/// Subject id carried by admin tokens; the admin has no database row.
pub const ADMIN_SUBJECT_ID: i64 = 0;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Lister,
    Admin,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(
    config: &Config,
    role: Role,
    subject_id: i64,
    email: &str,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: subject_id,
        role,
        email: email.to_owned(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(config.token_ttl_hours)).timestamp(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_token(config: &Config, token: &str) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

/// The authenticated caller, extracted from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
    pub email: String,
}

impl AuthUser {
    pub fn require(&self, role: Role) -> Result<i64, AppError> {
        self.require_any(&[role])
    }

    pub fn require_any(&self, roles: &[Role]) -> Result<i64, AppError> {
        if roles.contains(&self.role) {
            Ok(self.id)
        } else {
            log::warn!(
                "{:?} {} denied access, needs one of {:?}",
                self.role,
                self.id,
                roles
            );
            Err(AppError::forbidden("Insufficient permissions"))
        }
    }

    pub fn is(&self, role: Role, id: i64) -> bool {
        self.role == role && self.id == id
    }

    fn from_http_request(req: &HttpRequest) -> Result<Self, AppError> {
        let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
            log::error!("AppState missing from app data");
            AppError::InternalServerError
        })?;

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_owned()))?;

        let claims = decode_token(&state.config, token).map_err(|e| {
            log::warn!("Rejected bearer token: {}", e);
            e
        })?;

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
            email: claims.email,
        })
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_http_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_config;

    #[test]
    fn token_round_trip_keeps_role_and_subject() {
        let config = test_config();
        let token = issue_token(&config, Role::Lister, 42, "lot@example.com").unwrap();
        let claims = decode_token(&config, &token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Lister);
        assert_eq!(claims.email, "lot@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let config = test_config();
        let mut other = test_config();
        other.jwt_secret = "a-different-secret".into();
        let token = issue_token(&other, Role::Admin, ADMIN_SUBJECT_ID, "x@y.z").unwrap();
        assert!(matches!(
            decode_token(&config, &token),
            Err(AppError::TokenError(_))
        ));
    }

    #[test]
    fn role_checks() {
        let user = AuthUser {
            id: 7,
            role: Role::User,
            email: "u@example.com".into(),
        };
        assert_eq!(user.require(Role::User).unwrap(), 7);
        assert!(matches!(
            user.require(Role::Admin),
            Err(AppError::Forbidden(_))
        ));
        assert!(user.require_any(&[Role::Lister, Role::User]).is_ok());
        assert!(user.is(Role::User, 7));
        assert!(!user.is(Role::Lister, 7));
    }
}
