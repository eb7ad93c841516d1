use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::db::courses::NewCourse;
use crate::error::{AppError, AppResult};
use crate::models::course_model::{
    Course, CourseView, CreateCourseRequest, UpdateCourseRequest, UpdateImageRequest, ViewerQuery,
};
use crate::models::subscription_model::SubscriptionType;
use crate::models::user_model::Role;
use crate::utils::access::{accessible_tiers, course_view};
use crate::utils::auth::AuthenticatedUser;
use crate::utils::validation;

/// Tier of whoever is looking: the bearer, else the `userId` query, else anonymous.
async fn viewer_tier(
    pool: &PgPool,
    caller: Option<&AuthenticatedUser>,
    user_id: Option<Uuid>,
) -> AppResult<SubscriptionType> {
    match caller.map(|c| c.id).or(user_id) {
        Some(id) => db::subscriptions::effective_tier(pool, id).await,
        None => Ok(SubscriptionType::Free),
    }
}

fn ensure_owner_or_admin(course: &Course, caller: &AuthenticatedUser, action: &str) -> AppResult<()> {
    if course.instructor_id != caller.id && !caller.is_admin() {
        return Err(AppError::forbidden(format!(
            "You are not allowed to {} this course",
            action
        )));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/courses",
    tag = "Courses",
    params(("userId" = Option<Uuid>, Query, description = "User whose access is evaluated")),
    responses((status = 200, description = "All courses with access information", body = [CourseView])),
)]
#[get("/courses")]
pub async fn list_courses(
    pool: web::Data<PgPool>,
    caller: Option<AuthenticatedUser>,
    query: web::Query<ViewerQuery>,
) -> AppResult<HttpResponse> {
    let tier = viewer_tier(&pool, caller.as_ref(), query.user_id).await?;
    let views: Vec<CourseView> = db::courses::list(&pool)
        .await?
        .into_iter()
        .map(|details| course_view(details, tier))
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

#[utoipa::path(
    get,
    path = "/courses/available/{user_id}",
    tag = "Courses",
    params(("user_id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "Courses the user's subscription unlocks", body = [CourseView])),
)]
#[get("/courses/available/{user_id}")]
pub async fn available_courses(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    let tier = db::subscriptions::effective_tier(&pool, user_id).await?;
    let views: Vec<CourseView> = db::courses::list_for_tiers(&pool, &accessible_tiers(tier))
        .await?
        .into_iter()
        .map(|details| course_view(details, tier))
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

#[utoipa::path(
    get,
    path = "/courses/{id}",
    tag = "Courses",
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("userId" = Option<Uuid>, Query, description = "User whose access is evaluated"),
    ),
    responses(
        (status = 200, description = "Course with access information", body = CourseView),
        (status = 404, description = "Course not found"),
    ),
)]
#[get("/courses/{id}")]
pub async fn get_course(
    pool: web::Data<PgPool>,
    caller: Option<AuthenticatedUser>,
    path: web::Path<Uuid>,
    query: web::Query<ViewerQuery>,
) -> AppResult<HttpResponse> {
    let details = db::courses::find_details(&pool, path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;
    let tier = viewer_tier(&pool, caller.as_ref(), query.user_id).await?;
    Ok(HttpResponse::Ok().json(course_view(details, tier)))
}

#[utoipa::path(
    post,
    path = "/courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid data"),
        (status = 403, description = "Caller is not an instructor or admin"),
    ),
)]
#[post("/courses")]
pub async fn create_course(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
    body: web::Json<CreateCourseRequest>,
) -> AppResult<HttpResponse> {
    if !matches!(caller.role, Role::Instructor | Role::Admin) {
        return Err(AppError::forbidden("Only instructors or admins can create courses"));
    }
    let req = body.into_inner();
    req.validate()?;

    let course = db::courses::insert(
        &pool,
        NewCourse {
            title: req.title.trim(),
            content: &req.content,
            subscription_required: req.subscription_required.unwrap_or_default(),
            instructor_id: caller.id,
            image: req.image.as_deref(),
        },
    )
    .await?;

    log::info!("User {} created course {}", caller.id, course.id);
    Ok(HttpResponse::Created().json(course))
}

#[utoipa::path(
    put,
    path = "/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 403, description = "Caller does not own the course"),
        (status = 404, description = "Course not found"),
    ),
)]
#[put("/courses/{id}")]
pub async fn update_course(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCourseRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let changes = body.into_inner();
    changes.validate()?;

    let course = db::courses::find(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;
    ensure_owner_or_admin(&course, &caller, "update")?;

    let updated = db::courses::update(&pool, id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;
    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    patch,
    path = "/courses/{id}/image",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = UpdateImageRequest,
    responses(
        (status = 200, description = "Image updated", body = Course),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Course not found"),
    ),
)]
#[patch("/courses/{id}/image")]
pub async fn update_course_image(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateImageRequest>,
) -> AppResult<HttpResponse> {
    if !caller.is_admin() {
        return Err(AppError::forbidden("Only admins can update course images"));
    }
    caller.require_current_admin(&pool).await?;
    validation::validate_url("image", &body.image)?;

    let course = db::courses::update_image(&pool, path.into_inner(), &body.image)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;
    Ok(HttpResponse::Ok().json(course))
}

#[utoipa::path(
    delete,
    path = "/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted", body = Course),
        (status = 403, description = "Caller does not own the course"),
        (status = 404, description = "Course not found"),
    ),
)]
#[delete("/courses/{id}")]
pub async fn delete_course(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let course = db::courses::find(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;
    ensure_owner_or_admin(&course, &caller, "delete")?;

    let deleted = db::courses::delete(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;

    log::info!("User {} deleted course {}", caller.id, id);
    Ok(HttpResponse::Ok().json(deleted))
}
