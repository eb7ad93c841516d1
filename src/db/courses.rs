use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::course_model::{Course, CourseDetails, CourseInstructorRow, UpdateCourseRequest};
use crate::models::subscription_model::SubscriptionType;

const DETAILS_SELECT: &str = "
    SELECT c.*, u.name AS instructor_name, u.email AS instructor_email
    FROM courses c
    JOIN users u ON u.id = c.instructor_id";

pub struct NewCourse<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub subscription_required: SubscriptionType,
    pub instructor_id: Uuid,
    pub image: Option<&'a str>,
}

pub async fn list(pool: &PgPool) -> AppResult<Vec<CourseDetails>> {
    let sql = format!("{} ORDER BY c.created_at DESC", DETAILS_SELECT);
    let rows = sqlx::query_as::<_, CourseInstructorRow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(CourseDetails::from).collect())
}

/// Courses whose required tier is one of `tiers`.
pub async fn list_for_tiers(pool: &PgPool, tiers: &[SubscriptionType]) -> AppResult<Vec<CourseDetails>> {
    let names: Vec<&str> = tiers.iter().map(|t| t.as_str()).collect();
    let sql = format!(
        "{} WHERE c.subscription_required::text = ANY($1) ORDER BY c.created_at DESC",
        DETAILS_SELECT
    );
    let rows = sqlx::query_as::<_, CourseInstructorRow>(&sql)
        .bind(names)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(CourseDetails::from).collect())
}

pub async fn find_details(pool: &PgPool, id: Uuid) -> AppResult<Option<CourseDetails>> {
    let sql = format!("{} WHERE c.id = $1", DETAILS_SELECT);
    let row = sqlx::query_as::<_, CourseInstructorRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(CourseDetails::from))
}

pub async fn find(pool: &PgPool, id: Uuid) -> AppResult<Option<Course>> {
    let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(course)
}

pub async fn insert(pool: &PgPool, new_course: NewCourse<'_>) -> AppResult<Course> {
    let course = sqlx::query_as::<_, Course>(
        "INSERT INTO courses (id, title, content, subscription_required, instructor_id, image)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(new_course.title)
    .bind(new_course.content)
    .bind(new_course.subscription_required)
    .bind(new_course.instructor_id)
    .bind(new_course.image)
    .fetch_one(pool)
    .await?;
    Ok(course)
}

pub async fn update(pool: &PgPool, id: Uuid, changes: &UpdateCourseRequest) -> AppResult<Option<Course>> {
    let course = sqlx::query_as::<_, Course>(
        "UPDATE courses
         SET title = COALESCE($2, title),
             content = COALESCE($3, content),
             subscription_required = COALESCE($4, subscription_required),
             image = COALESCE($5, image),
             updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(changes.title.as_deref().map(str::trim))
    .bind(changes.content.as_deref())
    .bind(changes.subscription_required)
    .bind(changes.image.as_deref())
    .fetch_optional(pool)
    .await?;
    Ok(course)
}

pub async fn update_image(pool: &PgPool, id: Uuid, image: &str) -> AppResult<Option<Course>> {
    let course = sqlx::query_as::<_, Course>(
        "UPDATE courses SET image = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(image)
    .fetch_optional(pool)
    .await?;
    Ok(course)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> AppResult<Option<Course>> {
    let course = sqlx::query_as::<_, Course>("DELETE FROM courses WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(course)
}
