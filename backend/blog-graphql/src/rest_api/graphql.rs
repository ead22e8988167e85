use actix_web::{web, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::config::GraphQLConfig;
use crate::middleware::AuthContext;
use crate::schema::AppSchema;

/// Execute one GraphQL request with the caller's auth verdict attached
pub async fn graphql_handler(
    schema: web::Data<AppSchema>,
    auth: AuthContext,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner().data(auth)).await.into()
}

pub async fn graphiql_handler(config: web::Data<GraphQLConfig>) -> HttpResponse {
    if !config.playground {
        return HttpResponse::NotFound().finish();
    }

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// SDL endpoint for client code generation
pub async fn schema_handler(schema: web::Data<AppSchema>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain")
        .body(schema.sdl())
}

pub async fn health_handler() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
