pub mod auth_model;
pub mod course_model;
pub mod subscription_model;
pub mod user_model;
