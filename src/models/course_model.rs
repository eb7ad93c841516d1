use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::subscription_model::SubscriptionType;
use crate::models::user_model::UserSummary;
use crate::utils::validation;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub subscription_required: SubscriptionType,
    pub instructor_id: Uuid,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join row: a course plus its instructor's name and email.
#[derive(Debug, sqlx::FromRow)]
pub struct CourseInstructorRow {
    #[sqlx(flatten)]
    pub course: Course,
    pub instructor_name: String,
    pub instructor_email: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseDetails {
    #[serde(flatten)]
    pub course: Course,
    pub instructor: UserSummary,
}

impl From<CourseInstructorRow> for CourseDetails {
    fn from(row: CourseInstructorRow) -> Self {
        let instructor = UserSummary {
            id: row.course.instructor_id,
            name: row.instructor_name,
            email: row.instructor_email,
        };
        CourseDetails {
            course: row.course,
            instructor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AccessLevelInfo {
    pub level: String,
    pub icon: String,
    pub description: String,
}

/// A course as seen by a particular viewer. `content` is redacted when the
/// viewer's tier is below the course requirement.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    #[serde(flatten)]
    pub details: CourseDetails,
    pub has_access: bool,
    pub user_subscription_required: bool,
    pub access_level: AccessLevelInfo,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: String,
    pub content: String,
    pub subscription_required: Option<SubscriptionType>,
    pub image: Option<String>,
}

impl CreateCourseRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::validate_length("title", &self.title, 1, 200)?;
        validation::validate_required("content", &self.content)?;
        if let Some(image) = &self.image {
            validation::validate_url("image", image)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub subscription_required: Option<SubscriptionType>,
    pub image: Option<String>,
}

impl UpdateCourseRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            validation::validate_length("title", title, 1, 200)?;
        }
        if let Some(content) = &self.content {
            validation::validate_required("content", content)?;
        }
        if let Some(image) = &self.image {
            validation::validate_url("image", image)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateImageRequest {
    pub image: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerQuery {
    pub user_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults_tier_to_none() {
        let req: CreateCourseRequest =
            serde_json::from_str(r#"{"title":"Intro","content":"Basics"}"#).unwrap();
        assert!(req.subscription_required.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_blank_title() {
        let req: CreateCourseRequest =
            serde_json::from_str(r#"{"title":"  ","content":"Basics","subscriptionRequired":"ANNUAL"}"#)
                .unwrap();
        assert_eq!(req.subscription_required, Some(SubscriptionType::Annual));
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_request_checks_only_present_fields() {
        assert!(UpdateCourseRequest::default().validate().is_ok());

        let bad_image = UpdateCourseRequest {
            image: Some("not a url".into()),
            ..Default::default()
        };
        assert!(bad_image.validate().is_err());
    }
}
