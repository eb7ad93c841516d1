//! Resets the database to a small demo data set.

use chrono::Utc;
use dotenv::dotenv;

use learnpro_api::config::Config;
use learnpro_api::db;
use learnpro_api::db::courses::NewCourse;
use learnpro_api::db::users::NewUser;
use learnpro_api::models::subscription_model::SubscriptionType;
use learnpro_api::models::user_model::Role;
use learnpro_api::subscriptions::strategy_for;
use learnpro_api::utils::auth::hash_password;

const DEMO_USERS: [(&str, &str, &str, Role); 3] = [
    ("student@test.com", "student123", "Demo Student", Role::Student),
    ("admin@test.com", "admin123", "Administrator", Role::Admin),
    ("instructor@test.com", "instructor123", "Demo Instructor", Role::Instructor),
];

const DEMO_COURSES: [(&str, &str, SubscriptionType); 3] = [
    (
        "Free Course: Introduction to Programming",
        "A free course covering the basic concepts of programming.",
        SubscriptionType::Free,
    ),
    (
        "Premium Course: Advanced JavaScript",
        "Advanced JavaScript with practical examples and real projects.",
        SubscriptionType::Monthly,
    ),
    (
        "Exclusive Course: Software Architecture",
        "Design patterns and enterprise software architecture.",
        SubscriptionType::Annual,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let pool = db::connect(&config).await?;
    db::run_migrations(&pool).await?;

    sqlx::query("TRUNCATE subscriptions, courses, users")
        .execute(&pool)
        .await?;
    log::info!("Cleared existing data");

    let mut users = Vec::with_capacity(DEMO_USERS.len());
    for (email, password, name, role) in DEMO_USERS {
        let password_hash = hash_password(password)?;
        let user = db::users::insert(
            &pool,
            NewUser {
                email,
                password_hash: &password_hash,
                name,
                role,
            },
        )
        .await?;
        log::info!("{} {} / {}", role, email, password);
        users.push(user);
    }
    let (student, admin, instructor) = (&users[0], &users[1], &users[2]);

    for (title, content, tier) in DEMO_COURSES {
        db::courses::insert(
            &pool,
            NewCourse {
                title,
                content,
                subscription_required: tier,
                instructor_id: instructor.id,
                image: None,
            },
        )
        .await?;
    }
    log::info!("Created {} courses", DEMO_COURSES.len());

    let now = Utc::now();
    db::subscriptions::create(&pool, strategy_for(SubscriptionType::Free), student.id, now).await?;
    db::subscriptions::create(&pool, strategy_for(SubscriptionType::Annual), admin.id, now).await?;
    log::info!("Student on FREE, admin on ANNUAL");

    Ok(())
}
