pub mod auth_handler;
pub mod course_handler;
pub mod subscription_handler;
pub mod user_handler;

use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use serde_json::json;

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(auth_handler::register)
        .service(auth_handler::login)
        .service(auth_handler::me)
        // literal segments before `{id}` captures
        .service(course_handler::available_courses)
        .service(course_handler::list_courses)
        .service(course_handler::create_course)
        .service(course_handler::get_course)
        .service(course_handler::update_course)
        .service(course_handler::update_course_image)
        .service(course_handler::delete_course)
        .service(subscription_handler::list_plans)
        .service(subscription_handler::get_plan)
        .service(subscription_handler::my_subscription)
        .service(subscription_handler::subscription_stats)
        .service(subscription_handler::user_subscriptions)
        .service(subscription_handler::list_subscriptions)
        .service(subscription_handler::create_subscription)
        .service(subscription_handler::cancel_subscription)
        .service(user_handler::user_stats)
        .service(user_handler::list_users)
        .service(user_handler::get_user)
        .service(user_handler::update_user)
        .service(user_handler::toggle_user_status)
        .service(user_handler::delete_user);
}
