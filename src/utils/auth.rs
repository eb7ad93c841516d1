use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::auth_model::AuthUser;
use crate::models::user_model::{Role, User};

/// Signing settings, registered as app data so the bearer extractor can reach them.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub role: Role,
    pub name: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored hash. Argon2 PHC strings are the
/// default; bcrypt hashes (`$2a$`, `$2b$`, `$2y$`) from older accounts are
/// still accepted.
pub fn verify_password(stored_hash: &str, password: &str) -> AppResult<bool> {
    if stored_hash.starts_with("$2") {
        return bcrypt::verify(password, stored_hash)
            .map_err(|e| AppError::internal(format!("Invalid bcrypt hash: {}", e)));
    }

    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn generate_jwt(user: &AuthUser, config: &JwtConfig) -> AppResult<String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::hours(config.expiry_hours))
        .ok_or_else(|| AppError::internal("Token expiry out of range"))?;

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
        name: user.name.clone(),
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("Failed to generate JWT: {}", e)))
}

pub fn decode_jwt(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}

/// Caller identity taken from a valid `Authorization: Bearer <jwt>` header.
///
/// Use `Option<AuthenticatedUser>` for endpoints that also serve anonymous callers.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub name: String,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if !self.is_admin() {
            return Err(AppError::forbidden("Administrator access required"));
        }
        Ok(())
    }

    /// Allows the user acting on their own resources, or an administrator.
    pub fn require_self_or_admin(&self, user_id: Uuid) -> AppResult<()> {
        if self.id != user_id && !self.is_admin() {
            return Err(AppError::forbidden("You are not allowed to access this resource"));
        }
        Ok(())
    }

    /// Token check plus a fresh read of the caller's row: a token issued
    /// before a demotion or deactivation no longer grants admin rights.
    pub async fn require_current_admin(&self, pool: &PgPool) -> AppResult<()> {
        self.require_admin()?;
        let user = db::users::find_by_id(pool, self.id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;
        ensure_active_admin(&user)
    }

    fn from_claims(claims: Claims) -> AppResult<Self> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid token subject"))?;
        Ok(AuthenticatedUser {
            id,
            email: claims.email,
            role: claims.role,
            name: claims.name,
        })
    }

    fn extract(req: &HttpRequest) -> AppResult<Self> {
        let config = req
            .app_data::<web::Data<JwtConfig>>()
            .ok_or_else(|| AppError::internal("JwtConfig is not registered"))?;

        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;

        let claims = decode_jwt(token, &config.secret)?;
        Self::from_claims(claims)
    }
}

fn ensure_active_admin(user: &User) -> AppResult<()> {
    if !user.is_active {
        return Err(AppError::unauthorized("User is inactive"));
    }
    if user.role != Role::Admin {
        return Err(AppError::forbidden("Administrator access required"));
    }
    Ok(())
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::extract(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiry_hours: 24,
        }
    }

    fn instructor() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "instructor@test.com".to_string(),
            role: Role::Instructor,
            name: "Instructor Test".to_string(),
        }
    }

    #[test]
    fn argon2_hash_verifies() {
        let hash = hash_password("student123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "student123").unwrap());
        assert!(!verify_password(&hash, "student124").unwrap());
    }

    #[test]
    fn legacy_bcrypt_hash_verifies() {
        let hash = bcrypt::hash("admin123", 4).unwrap();
        assert!(verify_password(&hash, "admin123").unwrap());
        assert!(!verify_password(&hash, "admin321").unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("not-a-hash", "whatever").is_err());
    }

    #[test]
    fn token_carries_identity() {
        let user = instructor();
        let token = generate_jwt(&user, &config()).unwrap();
        let claims = decode_jwt(&token, "test-secret").unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, Role::Instructor);
        assert_eq!(claims.email, "instructor@test.com");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);

        let caller = AuthenticatedUser::from_claims(claims).unwrap();
        assert_eq!(caller.id, user.id);
        assert!(!caller.is_admin());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = generate_jwt(&instructor(), &config()).unwrap();
        let err = decode_jwt(&token, "another-secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let expired = JwtConfig {
            secret: "test-secret".to_string(),
            expiry_hours: -2,
        };
        let token = generate_jwt(&instructor(), &expired).unwrap();
        assert!(decode_jwt(&token, "test-secret").is_err());
    }

    #[test]
    fn ownership_checks() {
        let me = AuthenticatedUser {
            id: Uuid::new_v4(),
            email: "student@test.com".into(),
            role: Role::Student,
            name: "Student".into(),
        };
        assert!(me.require_self_or_admin(me.id).is_ok());
        assert!(me.require_self_or_admin(Uuid::new_v4()).is_err());
        assert!(me.require_admin().is_err());

        let admin = AuthenticatedUser {
            role: Role::Admin,
            ..me.clone()
        };
        assert!(admin.require_self_or_admin(Uuid::new_v4()).is_ok());
        assert!(admin.require_admin().is_ok());
    }

    #[test]
    fn stored_row_overrides_token_role() {
        let mut row = User {
            id: Uuid::new_v4(),
            email: "admin@test.com".into(),
            password: String::new(),
            name: "Administrator".into(),
            role: Role::Admin,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(ensure_active_admin(&row).is_ok());

        row.role = Role::Instructor;
        assert!(matches!(ensure_active_admin(&row), Err(AppError::Forbidden(_))));

        row.role = Role::Admin;
        row.is_active = false;
        assert!(matches!(ensure_active_admin(&row), Err(AppError::Unauthorized(_))));
    }
}
