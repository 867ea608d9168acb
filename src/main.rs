use actix_cors::Cors;
use actix_web::{middleware::from_fn, middleware::Logger, web, App, HttpServer};
use color_eyre::Result;
use eyre::WrapErr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use yuz_analiz::{
    config::{config::Config, database::run_migrations},
    middleware::{rate_limit::rate_limit, security_headers::security_headers},
    routes, AppState,
};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let pool = config.db_pool().await?;
    run_migrations(&pool)
        .await
        .wrap_err("Running database migrations")?;
    config.warn_insecure_defaults();

    let state = web::Data::new(AppState::from_config(pool, &config));
    let address = (config.host.clone(), config.port);
    info!("Server listening on {}:{}", address.0, address.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(from_fn(rate_limit))
            .wrap(Cors::permissive())
            .wrap(security_headers())
            .wrap(Logger::default())
            .configure(routes)
    })
    .bind(address)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
