use actix_web::{get, patch, post, web, HttpResponse};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::subscription_model::{CreateSubscriptionRequest, SubscriptionStats, SubscriptionType};
use crate::subscriptions::{all_plans, strategy_for, SubscriptionContext};
use crate::utils::auth::AuthenticatedUser;

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[utoipa::path(
    get,
    path = "/subscriptions/plans",
    tag = "Subscriptions",
    responses((status = 200, description = "All subscription plans", body = [PlanInfo])),
)]
#[get("/subscriptions/plans")]
pub async fn list_plans() -> HttpResponse {
    HttpResponse::Ok().json(all_plans())
}

#[utoipa::path(
    get,
    path = "/subscriptions/plans/{plan_type}",
    tag = "Subscriptions",
    params(("plan_type" = String, Path, description = "free, monthly or annual")),
    responses(
        (status = 200, description = "Plan details", body = PlanInfo),
        (status = 400, description = "Unsupported subscription type"),
    ),
)]
#[get("/subscriptions/plans/{plan_type}")]
pub async fn get_plan(path: web::Path<String>) -> AppResult<HttpResponse> {
    let context = SubscriptionContext::for_type(&path)?;
    Ok(HttpResponse::Ok().json(context.plan_info()))
}

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = CreatedSubscription),
        (status = 400, description = "Unsupported type or duplicate free subscription"),
        (status = 403, description = "Creating a subscription for another user"),
        (status = 404, description = "User not found"),
    ),
)]
#[post("/subscriptions")]
pub async fn create_subscription(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
    body: web::Json<CreateSubscriptionRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let context = SubscriptionContext::for_type(&req.subscription_type)?;

    let user_id = req.user_id.unwrap_or(caller.id);
    caller.require_self_or_admin(user_id)?;

    let created = context.create(&pool, user_id, req.start_date).await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    get,
    path = "/subscriptions/me",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's active subscription", body = SubscriptionWithUser),
        (status = 404, description = "No active subscription"),
    ),
)]
#[get("/subscriptions/me")]
pub async fn my_subscription(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let current = db::subscriptions::find_active(&pool, caller.id)
        .await?
        .filter(|s| s.subscription.is_current(Utc::now()))
        .ok_or_else(|| AppError::not_found("No active subscription"))?;
    Ok(HttpResponse::Ok().json(current))
}

#[utoipa::path(
    get,
    path = "/subscriptions/user/{user_id}",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    params(("user_id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Subscription history, newest first", body = [Subscription]),
        (status = 403, description = "Not the caller's history"),
    ),
)]
#[get("/subscriptions/user/{user_id}")]
pub async fn user_subscriptions(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    caller.require_self_or_admin(user_id)?;
    let history = db::subscriptions::list_for_user(&pool, user_id).await?;
    Ok(HttpResponse::Ok().json(history))
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every subscription", body = [SubscriptionWithUser]),
        (status = 403, description = "Administrator access required"),
    ),
)]
#[get("/subscriptions")]
pub async fn list_subscriptions(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    caller.require_current_admin(&pool).await?;
    let subscriptions = db::subscriptions::list_all(&pool).await?;
    Ok(HttpResponse::Ok().json(subscriptions))
}

#[utoipa::path(
    patch,
    path = "/subscriptions/{id}/cancel",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription cancelled", body = Subscription),
        (status = 400, description = "Subscription already inactive"),
        (status = 403, description = "Not the caller's subscription"),
        (status = 404, description = "Subscription not found"),
    ),
)]
#[patch("/subscriptions/{id}/cancel")]
pub async fn cancel_subscription(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let subscription = db::subscriptions::find(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Subscription not found"))?;
    caller.require_self_or_admin(subscription.user_id)?;

    if !subscription.active {
        return Err(AppError::bad_request("Subscription is already inactive"));
    }

    let cancelled = db::subscriptions::deactivate(&pool, id).await?;
    log::info!("User {} cancelled subscription {}", caller.id, id);
    Ok(HttpResponse::Ok().json(cancelled))
}

#[utoipa::path(
    get,
    path = "/subscriptions/stats",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscription counters and revenue estimate", body = SubscriptionStats),
        (status = 403, description = "Administrator access required"),
    ),
)]
#[get("/subscriptions/stats")]
pub async fn subscription_stats(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    caller.require_current_admin(&pool).await?;
    let (total, active, by_type) = db::subscriptions::counts(&pool).await?;

    let revenue = |tier: SubscriptionType| round_cents(by_type.get(tier) as f64 * strategy_for(tier).price());
    let stats = SubscriptionStats {
        total_subscriptions: total,
        active_subscriptions: active,
        monthly_revenue: revenue(SubscriptionType::Monthly),
        yearly_revenue: revenue(SubscriptionType::Annual),
        by_type,
    };
    Ok(HttpResponse::Ok().json(stats))
}

#[cfg(test)]
mod tests {
    use super::round_cents;

    #[test]
    fn revenue_is_rounded_to_cents() {
        assert_eq!(round_cents(3.0 * 9.99), 29.97);
        assert_eq!(round_cents(7.0 * 99.99), 699.93);
        assert_eq!(round_cents(0.0), 0.0);
    }
}
