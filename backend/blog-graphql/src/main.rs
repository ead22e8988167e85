use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use crypto_core::jwt::TokenService;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;

use blog_graphql::config::{Config, ServerConfig};
use blog_graphql::images::ImageStore;
use blog_graphql::middleware::AuthGate;
use blog_graphql::rest_api::configure_routes;
use blog_graphql::schema::build_schema;
use blog_graphql::state::AppState;

fn cors(server: &ServerConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["OPTIONS", "GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600);

    for origin in server.cors_allowed_origins.split(',') {
        let origin = origin.trim();
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else if !origin.is_empty() {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,blog_graphql=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(true),
        )
        .init();

    info!("Starting blog GraphQL service...");

    let config = Config::from_env().context("Failed to load configuration")?;

    let tokens = Arc::new(
        TokenService::new(&config.jwt.secret, config.jwt.expiry_seconds)
            .context("Failed to initialize token service")?,
    );
    info!(expiry_seconds = tokens.expiry_seconds(), "Token service ready");

    let state = AppState::in_memory(tokens.clone());
    let schema = build_schema(state, &config.graphql);

    let images = ImageStore::new(config.upload.root_dir.clone());
    tokio::fs::create_dir_all(images.images_dir())
        .await
        .with_context(|| format!("Failed to create {}", images.images_dir().display()))?;

    let bind_addr = config.bind_addr();
    info!(%bind_addr, playground = config.graphql.playground, "Listening");

    let server_config = config.server.clone();
    let graphql_config = config.graphql.clone();
    let upload_config = config.upload.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(schema.clone()))
            .app_data(web::Data::new(graphql_config.clone()))
            .app_data(web::Data::new(images.clone()))
            .app_data(web::Data::new(upload_config.clone()))
            .wrap(AuthGate::new(tokens.clone()))
            .wrap(cors(&server_config))
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {bind_addr}"))?
    .run()
    .await
    .context("Server error")?;

    Ok(())
}
