use actix_web::{delete, get, put, web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::user_model::{MessageResponse, UpdateUserRequest, UserListQuery, UserProfile};
use crate::utils::auth::AuthenticatedUser;
use crate::utils::validation;

async fn load_profile(pool: &PgPool, id: Uuid) -> AppResult<UserProfile> {
    db::users::profile(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("role" = Option<String>, Query, description = "STUDENT, INSTRUCTOR or ADMIN")),
    responses(
        (status = 200, description = "Users, newest first", body = [UserProfile]),
        (status = 403, description = "Administrator access required"),
    ),
)]
#[get("/users")]
pub async fn list_users(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
    query: web::Query<UserListQuery>,
) -> AppResult<HttpResponse> {
    caller.require_current_admin(&pool).await?;
    let users = db::users::list_profiles(&pool, query.role).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    get,
    path = "/users/stats/overview",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User counters", body = UserStats),
        (status = 403, description = "Administrator access required"),
    ),
)]
#[get("/users/stats/overview")]
pub async fn user_stats(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    caller.require_current_admin(&pool).await?;
    Ok(HttpResponse::Ok().json(db::users::stats(&pool).await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserProfile),
        (status = 403, description = "Not the caller's profile"),
        (status = 404, description = "User not found"),
    ),
)]
#[get("/users/{id}")]
pub async fn get_user(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    caller.require_self_or_admin(id)?;
    Ok(HttpResponse::Ok().json(load_profile(&pool, id).await?))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserProfile),
        (status = 400, description = "Invalid data or email already in use"),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "User not found"),
    ),
)]
#[put("/users/{id}")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let changes = body.into_inner();

    caller.require_self_or_admin(id)?;
    if changes.changes_privileges() {
        caller.require_admin()?;
        if id == caller.id && changes.is_active == Some(false) {
            return Err(AppError::bad_request("Administrators cannot deactivate themselves"));
        }
        caller.require_current_admin(&pool).await?;
    }

    if let Some(name) = &changes.name {
        validation::validate_length("name", name, 1, 100)?;
    }
    let email = match &changes.email {
        Some(email) => {
            validation::validate_email(email)?;
            Some(validation::normalize_email(email))
        }
        None => None,
    };

    if !db::users::update(&pool, id, &changes, email.as_deref()).await? {
        return Err(AppError::not_found("User not found"));
    }
    Ok(HttpResponse::Ok().json(load_profile(&pool, id).await?))
}

#[utoipa::path(
    put,
    path = "/users/{id}/toggle-status",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User with flipped active flag", body = UserProfile),
        (status = 403, description = "Administrator access required"),
        (status = 404, description = "User not found"),
    ),
)]
#[put("/users/{id}/toggle-status")]
pub async fn toggle_user_status(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    caller.require_admin()?;
    let id = path.into_inner();
    if id == caller.id {
        return Err(AppError::bad_request("Administrators cannot deactivate themselves"));
    }
    caller.require_current_admin(&pool).await?;

    if !db::users::toggle_status(&pool, id).await? {
        return Err(AppError::not_found("User not found"));
    }
    let profile = load_profile(&pool, id).await?;
    log::info!("User {} set active={} by {}", id, profile.is_active, caller.id);
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 403, description = "Administrator access required"),
        (status = 404, description = "User not found"),
    ),
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    caller.require_current_admin(&pool).await?;
    let id = path.into_inner();
    if !db::users::delete(&pool, id).await? {
        return Err(AppError::not_found("User not found"));
    }

    log::info!("User {} deleted by {}", id, caller.id);
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
