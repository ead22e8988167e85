//! HTTP routes
//!
//! ```text
//! POST /graphql         GraphQL operations
//! GET  /graphql         GraphiQL (when enabled)
//! GET  /graphql/schema  SDL
//! GET  /health          liveness
//! PUT  /post-image      multipart image upload
//! ```
//!
//! Every route sits behind [`AuthGate`](crate::middleware::AuthGate), which
//! attaches the request's [`AuthContext`](crate::middleware::AuthContext).

pub mod graphql;
pub mod media;

use actix_web::web;

pub use graphql::{graphiql_handler, graphql_handler, health_handler, schema_handler};
pub use media::upload_post_image;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/graphql", web::post().to(graphql_handler))
        .route("/graphql", web::get().to(graphiql_handler))
        .route("/graphql/schema", web::get().to(schema_handler))
        .route("/health", web::get().to(health_handler))
        .route("/post-image", web::put().to(upload_post_image));
}
