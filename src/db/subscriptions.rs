use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::subscription_model::{
    Subscription, SubscriptionType, SubscriptionUserRow, SubscriptionWithUser, TierCounts,
};
use crate::models::user_model::UserSummary;
use crate::subscriptions::SubscriptionStrategy;

const WITH_USER_SELECT: &str = "
    SELECT s.*, u.name AS user_name, u.email AS user_email
    FROM subscriptions s
    JOIN users u ON u.id = s.user_id";

/// Tier the user currently holds; FREE when nothing is active and in its
/// date window.
pub async fn effective_tier(pool: &PgPool, user_id: Uuid) -> AppResult<SubscriptionType> {
    let tier = sqlx::query_scalar::<_, SubscriptionType>(
        "SELECT type FROM subscriptions
         WHERE user_id = $1 AND active AND start_date <= NOW() AND end_date > NOW()
         ORDER BY created_at DESC
         LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(tier.unwrap_or_default())
}

pub async fn find_active(pool: &PgPool, user_id: Uuid) -> AppResult<Option<SubscriptionWithUser>> {
    let sql = format!(
        "{} WHERE s.user_id = $1 AND s.active ORDER BY s.created_at DESC LIMIT 1",
        WITH_USER_SELECT
    );
    let row = sqlx::query_as::<_, SubscriptionUserRow>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(SubscriptionWithUser::from))
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> AppResult<Vec<Subscription>> {
    let subs = sqlx::query_as::<_, Subscription>(
        "SELECT * FROM subscriptions WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(subs)
}

pub async fn list_all(pool: &PgPool) -> AppResult<Vec<SubscriptionWithUser>> {
    let sql = format!("{} ORDER BY s.created_at DESC", WITH_USER_SELECT);
    let rows = sqlx::query_as::<_, SubscriptionUserRow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(SubscriptionWithUser::from).collect())
}

pub async fn find(pool: &PgPool, id: Uuid) -> AppResult<Option<Subscription>> {
    let sub = sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(sub)
}

pub async fn deactivate(pool: &PgPool, id: Uuid) -> AppResult<Subscription> {
    let sub = sqlx::query_as::<_, Subscription>(
        "UPDATE subscriptions SET active = FALSE WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(sub)
}

/// Opens a subscription for `user_id` using `strategy`'s terms.
///
/// Runs in one transaction with the user row locked: the user's previous
/// active subscription is closed before the new one is inserted, so a user
/// never holds two active subscriptions.
pub async fn create(
    pool: &PgPool,
    strategy: &dyn SubscriptionStrategy,
    user_id: Uuid,
    start: DateTime<Utc>,
) -> AppResult<SubscriptionWithUser> {
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, (Uuid, String, String)>(
        "SELECT id, name, email FROM users WHERE id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    let current = sqlx::query_scalar::<_, SubscriptionType>(
        "SELECT type FROM subscriptions WHERE user_id = $1 AND active",
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    if current == Some(strategy.tier()) && !strategy.allows_renewal() {
        return Err(AppError::bad_request(format!(
            "User already has an active {} subscription",
            strategy.tier().as_str().to_lowercase()
        )));
    }

    sqlx::query("UPDATE subscriptions SET active = FALSE WHERE user_id = $1 AND active")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let subscription = sqlx::query_as::<_, Subscription>(
        "INSERT INTO subscriptions (id, user_id, type, start_date, end_date, active)
         VALUES ($1, $2, $3, $4, $5, TRUE)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(strategy.tier())
    .bind(start)
    .bind(strategy.end_date(start))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    let (id, name, email) = user;
    Ok(SubscriptionWithUser {
        subscription,
        user: UserSummary { id, name, email },
    })
}

pub async fn counts(pool: &PgPool) -> AppResult<(i64, i64, TierCounts)> {
    let (total, active): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*),
                COUNT(*) FILTER (WHERE active AND start_date <= NOW() AND end_date > NOW())
         FROM subscriptions",
    )
    .fetch_one(pool)
    .await?;

    let by_type: Vec<(SubscriptionType, i64)> = sqlx::query_as(
        "SELECT type, COUNT(*) FROM subscriptions
         WHERE active AND start_date <= NOW() AND end_date > NOW()
         GROUP BY type",
    )
    .fetch_all(pool)
    .await?;

    Ok((total, active, by_type.into_iter().collect()))
}
