use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{auth_handler, course_handler, subscription_handler, user_handler};
use crate::models::auth_model::{AuthResponse, AuthUser, LoginRequest, RegisterRequest};
use crate::models::course_model::{
    AccessLevelInfo, Course, CourseDetails, CourseView, CreateCourseRequest, UpdateCourseRequest,
    UpdateImageRequest,
};
use crate::models::subscription_model::{
    CreateSubscriptionRequest, CreatedSubscription, PlanInfo, Subscription, SubscriptionStats,
    SubscriptionType, SubscriptionWithUser, TierCounts,
};
use crate::models::user_model::{
    MessageResponse, Role, RoleCounts, UpdateUserRequest, UserProfile, UserStats, UserSummary,
};

pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LearnPro API",
        description = "Courses, users and tiered subscriptions",
        version = "1.0"
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::me,
        course_handler::list_courses,
        course_handler::available_courses,
        course_handler::get_course,
        course_handler::create_course,
        course_handler::update_course,
        course_handler::update_course_image,
        course_handler::delete_course,
        subscription_handler::list_plans,
        subscription_handler::get_plan,
        subscription_handler::create_subscription,
        subscription_handler::my_subscription,
        subscription_handler::user_subscriptions,
        subscription_handler::list_subscriptions,
        subscription_handler::cancel_subscription,
        subscription_handler::subscription_stats,
        user_handler::list_users,
        user_handler::user_stats,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::toggle_user_status,
        user_handler::delete_user,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        AuthUser,
        AuthResponse,
        Role,
        UserSummary,
        UserProfile,
        UpdateUserRequest,
        RoleCounts,
        UserStats,
        MessageResponse,
        Course,
        CourseDetails,
        CourseView,
        AccessLevelInfo,
        CreateCourseRequest,
        UpdateCourseRequest,
        UpdateImageRequest,
        SubscriptionType,
        Subscription,
        SubscriptionWithUser,
        CreatedSubscription,
        CreateSubscriptionRequest,
        PlanInfo,
        TierCounts,
        SubscriptionStats,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Courses", description = "Course catalogue with tier-gated content"),
        (name = "Subscriptions", description = "Plans and user subscriptions"),
        (name = "Users", description = "User administration"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI under `/api/`, backed by the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/api/{_:.*}").url(OPENAPI_JSON, ApiDoc::openapi())
}
