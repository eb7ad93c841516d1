use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::user_model::{Role, User};
use crate::utils::validation;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    /// Honoured only when the caller is an administrator.
    pub role: Option<Role>,
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::validate_email(&self.email)?;
        validation::validate_length("name", &self.name, 1, 100)?;
        validation::validate_password(&self.password)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Identity embedded in issued tokens and returned next to them.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub name: String,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        AuthUser {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: AuthUser,
}
