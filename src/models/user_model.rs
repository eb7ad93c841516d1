use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::subscription_model::{SubscriptionType, TierCounts};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Student,
    Instructor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Instructor => "INSTRUCTOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full `users` row, password hash included. Never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Public view of a user with their current subscription tier.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub subscription_type: SubscriptionType,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    /// Whether the update touches fields only an administrator may change.
    pub fn changes_privileges(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<Role>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub struct RoleCounts {
    pub student: i64,
    pub instructor: i64,
    pub admin: i64,
}

impl FromIterator<(Role, i64)> for RoleCounts {
    fn from_iter<I: IntoIterator<Item = (Role, i64)>>(iter: I) -> Self {
        let mut counts = RoleCounts::default();
        for (role, count) in iter {
            match role {
                Role::Student => counts.student += count,
                Role::Instructor => counts.instructor += count,
                Role::Admin => counts.admin += count,
            }
        }
        counts
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub inactive_users: i64,
    pub users_by_role: RoleCounts,
    pub users_by_subscription: TierCounts,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_json() {
        let role: Role = serde_json::from_str("\"INSTRUCTOR\"").unwrap();
        assert_eq!(role, Role::Instructor);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert!(serde_json::from_str::<Role>("\"teacher\"").is_err());
        assert_eq!(Role::default(), Role::Student);
    }

    #[test]
    fn privilege_changes_are_detected() {
        let rename = UpdateUserRequest {
            name: Some("New Name".into()),
            ..Default::default()
        };
        assert!(!rename.changes_privileges());

        let promote = UpdateUserRequest {
            role: Some(Role::Admin),
            ..Default::default()
        };
        assert!(promote.changes_privileges());
    }

    #[test]
    fn role_counts_accumulate() {
        let counts: RoleCounts = vec![(Role::Student, 3), (Role::Admin, 1), (Role::Student, 2)]
            .into_iter()
            .collect();
        assert_eq!(counts.student, 5);
        assert_eq!(counts.instructor, 0);
        assert_eq!(counts.admin, 1);
    }
}
