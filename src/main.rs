use std::sync::Arc;

use actix_web::{
    middleware,
    web::{self, Data},
    App, HttpServer,
};
use log::info;
use sqlx::SqlitePool;

mod auth;
mod availability;
mod config;
mod db;
mod errors;
mod routes;
mod structs;
mod utils;

#[cfg(test)]
mod test_support;

use config::Config;

#[derive(Debug, Clone)]
pub struct AppState {
    db_pool: SqlitePool,
    config: Arc<Config>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().unwrap_or_else(|e| {
        log::error!("FATAL: {}", e);
        std::process::exit(1);
    });

    if config.admin_password.is_none() {
        log::warn!("ADMIN_PASSWORD not set, admin login is disabled");
    }

    let db_pool = db::connect(&config.database_url).await?;

    let bind_addr = config.bind_addr();
    info!(
        "Starting HTTP server on http://{}:{}/",
        bind_addr.0, bind_addr.1
    );

    let state = AppState {
        db_pool,
        config: Arc::new(config),
    };

    HttpServer::new(move || {
        App::new()
            // enable automatic response compression - usually register this first
            .wrap(middleware::Compress::default())
            // enable logger - always register Actix Web Logger middleware last
            .wrap(middleware::Logger::default())
            .app_data(Data::new(state.clone()))
            .configure(routes::configure)
            .default_service(web::to(routes::default_handler))
    })
    .bind(bind_addr)?
    .run()
    .await
}
