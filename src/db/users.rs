use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::subscription_model::{SubscriptionType, TierCounts};
use crate::models::user_model::{Role, RoleCounts, UpdateUserRequest, User, UserProfile, UserStats};

// current subscription joined in; at most one row matches per user
const PROFILE_SELECT: &str = "
    SELECT u.id, u.name, u.email, u.role, u.is_active, u.created_at,
           COALESCE(s.type, 'FREE'::subscription_type) AS subscription_type
    FROM users u
    LEFT JOIN subscriptions s
           ON s.user_id = u.id AND s.active
          AND s.start_date <= NOW() AND s.end_date > NOW()";

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub role: Role,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn insert(pool: &PgPool, new_user: NewUser<'_>) -> AppResult<User> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, password, name, role)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .bind(new_user.name)
    .bind(new_user.role)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_unique_violation(e, "Email already in use"))
}

pub async fn profile(pool: &PgPool, id: Uuid) -> AppResult<Option<UserProfile>> {
    let sql = format!("{} WHERE u.id = $1", PROFILE_SELECT);
    let profile = sqlx::query_as::<_, UserProfile>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

pub async fn list_profiles(pool: &PgPool, role: Option<Role>) -> AppResult<Vec<UserProfile>> {
    let sql = format!(
        "{} WHERE ($1::user_role IS NULL OR u.role = $1) ORDER BY u.created_at DESC",
        PROFILE_SELECT
    );
    let profiles = sqlx::query_as::<_, UserProfile>(&sql)
        .bind(role)
        .fetch_all(pool)
        .await?;
    Ok(profiles)
}

/// Applies the fields present in `changes`. Returns `false` when no such user exists.
pub async fn update(pool: &PgPool, id: Uuid, changes: &UpdateUserRequest, email: Option<&str>) -> AppResult<bool> {
    let result = sqlx::query(
        "UPDATE users
         SET name = COALESCE($2, name),
             email = COALESCE($3, email),
             role = COALESCE($4, role),
             is_active = COALESCE($5, is_active),
             updated_at = NOW()
         WHERE id = $1",
    )
    .bind(id)
    .bind(changes.name.as_deref().map(str::trim))
    .bind(email)
    .bind(changes.role)
    .bind(changes.is_active)
    .execute(pool)
    .await
    .map_err(|e| AppError::from_unique_violation(e, "Email already in use"))?;
    Ok(result.rows_affected() > 0)
}

pub async fn toggle_status(pool: &PgPool, id: Uuid) -> AppResult<bool> {
    let result = sqlx::query(
        "UPDATE users SET is_active = NOT is_active, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn stats(pool: &PgPool) -> AppResult<UserStats> {
    let (total_users, active_users): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM users",
    )
    .fetch_one(pool)
    .await?;

    let by_role: Vec<(Role, i64)> =
        sqlx::query_as("SELECT role, COUNT(*) FROM users GROUP BY role")
            .fetch_all(pool)
            .await?;

    let by_subscription: Vec<(SubscriptionType, i64)> = sqlx::query_as(
        "SELECT type, COUNT(*) FROM subscriptions
         WHERE active AND start_date <= NOW() AND end_date > NOW()
         GROUP BY type",
    )
    .fetch_all(pool)
    .await?;

    Ok(UserStats {
        total_users,
        active_users,
        inactive_users: total_users - active_users,
        users_by_role: by_role.into_iter().collect::<RoleCounts>(),
        users_by_subscription: by_subscription.into_iter().collect::<TierCounts>(),
    })
}
