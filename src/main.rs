use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;

use learnpro_api::config::Config;
use learnpro_api::{configure_app, db};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;

    let pool = db::connect(&config).await?;
    log::info!("Connected to PostgreSQL");

    db::run_migrations(&pool).await?;
    log::info!("Migrations applied");

    let pool = web::Data::new(pool);
    let jwt = web::Data::new(config.jwt());
    let frontend_url = config.frontend_url.clone();

    log::info!("Listening on http://{}:{} (Swagger UI at /api/)", config.host, config.port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(pool.clone())
            .app_data(jwt.clone())
            .configure(configure_app)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
