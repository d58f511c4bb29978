use actix_web::{App, HttpServer, middleware, web};

use pr_intake::config::AppConfig;
use pr_intake::{db, handlers, models::document};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load().map_err(|e| {
        log::error!("{e}");
        std::io::Error::other(e)
    })?;
    log::debug!("Loaded {config:?}");

    let pool = db::init_pool(&config).await.map_err(|e| {
        log::error!("Failed to connect to database: {e}");
        std::io::Error::other(e)
    })?;

    // Create the table if absent; without it no request can succeed.
    document::ensure_schema(&pool, false).await.map_err(|e| {
        log::error!("Failed to create schema: {e}");
        std::io::Error::other(e.to_string())
    })?;

    let bind_addr = config.bind_addr();
    log::info!(
        "Starting server at http://{}:{} (public url {})",
        bind_addr.0,
        bind_addr.1,
        config.public_url
    );

    let config = web::Data::new(config);
    let pool = web::Data::new(pool);

    HttpServer::new(move || {
        let paths = config.paths.clone();
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(pool.clone())
            .app_data(config.clone())
            .configure(|cfg| handlers::configure(cfg, &paths))
    })
    .bind(bind_addr)?
    .run()
    .await
}
