use actix_web::{get, post, web, HttpResponse};
use sqlx::PgPool;

use crate::db;
use crate::db::users::NewUser;
use crate::error::{AppError, AppResult};
use crate::models::auth_model::{AuthResponse, AuthUser, LoginRequest, RegisterRequest};
use crate::models::user_model::{Role, User};
use crate::utils::auth::{generate_jwt, hash_password, verify_password, AuthenticatedUser, JwtConfig};
use crate::utils::validation::normalize_email;

fn auth_response(user: &User, jwt: &JwtConfig) -> AppResult<AuthResponse> {
    let auth_user = AuthUser::from(user);
    let access_token = generate_jwt(&auth_user, jwt)?;
    Ok(AuthResponse {
        access_token,
        user: auth_user,
    })
}

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid data or email already registered"),
    ),
)]
#[post("/auth/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    jwt: web::Data<JwtConfig>,
    caller: Option<AuthenticatedUser>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    // only an administrator may hand out a role other than STUDENT
    let role = match (req.role, &caller) {
        (Some(role), Some(admin)) if admin.is_admin() => {
            admin.require_current_admin(&pool).await?;
            role
        }
        (Some(role), _) if role != Role::Student => {
            return Err(AppError::forbidden("Only administrators can assign roles"));
        }
        _ => Role::Student,
    };

    let email = normalize_email(&req.email);
    if db::users::find_by_email(&pool, &email).await?.is_some() {
        return Err(AppError::bad_request("Email already in use"));
    }

    let password_hash = hash_password(&req.password)?;
    let user = db::users::insert(
        &pool,
        NewUser {
            email: &email,
            password_hash: &password_hash,
            name: req.name.trim(),
            role,
        },
    )
    .await?;

    log::info!("Registered user {} with role {}", user.id, user.role);
    Ok(HttpResponse::Created().json(auth_response(&user, &jwt)?))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = AuthResponse),
        (status = 401, description = "Invalid credentials or inactive user"),
    ),
)]
#[post("/auth/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    jwt: web::Data<JwtConfig>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let email = normalize_email(&req.email);

    let user = match db::users::find_by_email(&pool, &email).await? {
        Some(user) => user,
        None => {
            log::warn!("Login attempt for unknown email");
            return Err(AppError::unauthorized("Invalid credentials"));
        }
    };

    if !verify_password(&user.password, &req.password)? {
        log::warn!("Failed login for user {}", user.id);
        return Err(AppError::unauthorized("Invalid credentials"));
    }
    if !user.is_active {
        return Err(AppError::unauthorized("User is inactive"));
    }

    Ok(HttpResponse::Ok().json(auth_response(&user, &jwt)?))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Missing or invalid token"),
    ),
)]
#[get("/auth/me")]
pub async fn me(pool: web::Data<PgPool>, caller: AuthenticatedUser) -> AppResult<HttpResponse> {
    let profile = db::users::profile(&pool, caller.id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;
    Ok(HttpResponse::Ok().json(profile))
}
