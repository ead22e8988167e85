//! End-to-end GraphQL tests through the HTTP stack
//!
//! Requests go through `AuthGate`, so authentication is exercised exactly as
//! clients see it: via the `Authorization: Bearer <token>` header.

use actix_web::{test, web, App};
use blog_graphql::config::{GraphQLConfig, UploadConfig};
use blog_graphql::images::ImageStore;
use blog_graphql::middleware::AuthGate;
use blog_graphql::rest_api::configure_routes;
use blog_graphql::schema::build_schema;
use blog_graphql::state::AppState;
use chrono::{Duration, Utc};
use crypto_core::jwt::TokenService;
use serde_json::{json, Value};
use std::sync::Arc;

const SECRET: &str = "test_secret_key_32_chars_minimum!";

struct TestApp {
    state: AppState,
    tokens: Arc<TokenService>,
}

impl TestApp {
    fn new() -> Self {
        let tokens = Arc::new(TokenService::new(SECRET, 3600).unwrap());
        Self {
            state: AppState::in_memory(tokens.clone()),
            tokens,
        }
    }

    async fn gql(&self, token: Option<&str>, query: &str, variables: Value) -> Value {
        let schema = build_schema(self.state.clone(), &GraphQLConfig::default());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(schema))
                .app_data(web::Data::new(GraphQLConfig::default()))
                .app_data(web::Data::new(ImageStore::new(".")))
                .app_data(web::Data::new(UploadConfig {
                    root_dir: ".".into(),
                    max_bytes: 1024,
                }))
                .wrap(AuthGate::new(self.tokens.clone()))
                .configure(configure_routes),
        )
        .await;

        let mut req = test::TestRequest::post()
            .uri("/graphql")
            .set_json(json!({ "query": query, "variables": variables }));
        if let Some(token) = token {
            req = req.insert_header(("Authorization", format!("Bearer {token}")));
        }

        let resp = test::call_service(&app, req.to_request()).await;
        assert!(resp.status().is_success());
        test::read_body_json(resp).await
    }

    async fn create_user(&self, email: &str, password: &str) -> Value {
        self.gql(
            None,
            r#"mutation($input: userInputData!) {
                createUser(userInput: $input) { _id email name status }
            }"#,
            json!({ "input": { "email": email, "password": password, "name": "Max" } }),
        )
        .await
    }

    async fn login(&self, email: &str, password: &str) -> Value {
        self.gql(
            None,
            r#"query($email: String!, $password: String!) {
                login(email: $email, password: $password) { token userId }
            }"#,
            json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn create_post(&self, token: Option<&str>, title: &str, content: &str) -> Value {
        self.gql(
            token,
            r#"mutation($input: postInputData!) {
                createPost(postInput: $input) {
                    _id title content imageUrl createdAt
                    creator { _id email }
                }
            }"#,
            json!({ "input": { "title": title, "content": content, "imageUrl": "images/cat.png" } }),
        )
        .await
    }

    /// Register and log in, returning (user id, token)
    async fn signed_in(&self, email: &str) -> (String, String) {
        self.create_user(email, "secret1").await;
        let body = self.login(email, "secret1").await;
        let auth = &body["data"]["login"];
        (
            auth["userId"].as_str().unwrap().to_string(),
            auth["token"].as_str().unwrap().to_string(),
        )
    }
}

fn first_error(body: &Value) -> &Value {
    &body["errors"][0]
}

#[actix_web::test]
async fn test_create_user_returns_profile_without_password() {
    let app = TestApp::new();
    let body = app.create_user("max@example.com", "secret1").await;

    assert!(body.get("errors").is_none(), "unexpected errors: {body}");
    let user = &body["data"]["createUser"];
    assert_eq!(user["email"], "max@example.com");
    assert_eq!(user["name"], "Max");
    assert_eq!(user["status"], "I am new!");
    assert!(user["_id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[actix_web::test]
async fn test_create_user_duplicate_email_conflicts() {
    let app = TestApp::new();
    app.create_user("max@example.com", "secret1").await;

    let body = app.create_user("max@example.com", "another1").await;
    let err = first_error(&body);
    assert_eq!(err["message"], "User exists already!");
    assert_eq!(err["extensions"]["status"], 409);
}

#[actix_web::test]
async fn test_create_user_reports_all_invalid_fields() {
    let app = TestApp::new();
    let body = app.create_user("not-an-email", "abc").await;

    let err = first_error(&body);
    assert_eq!(err["message"], "Invalid input.");
    assert_eq!(err["extensions"]["status"], 422);
    assert_eq!(
        err["extensions"]["data"],
        json!([
            { "message": "E-Mail is invalid." },
            { "message": "Password too short!" }
        ])
    );
}

#[actix_web::test]
async fn test_login_token_identifies_user() {
    let app = TestApp::new();
    let created = app.create_user("max@example.com", "secret1").await;
    let user_id = created["data"]["createUser"]["_id"].as_str().unwrap().to_string();

    let body = app.login("max@example.com", "secret1").await;
    let auth = &body["data"]["login"];
    assert_eq!(auth["userId"], user_id.as_str());

    let claims = app.tokens.verify(auth["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.user_id(), user_id);
}

#[actix_web::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let app = TestApp::new();
    app.create_user("max@example.com", "secret1").await;

    let wrong_password = app.login("max@example.com", "wrong-password").await;
    let unknown_email = app.login("nobody@example.com", "secret1").await;

    assert_eq!(first_error(&wrong_password)["extensions"]["status"], 401);
    assert_eq!(
        first_error(&wrong_password)["message"],
        first_error(&unknown_email)["message"]
    );
}

#[actix_web::test]
async fn test_create_post_without_token_writes_nothing() {
    let app = TestApp::new();
    let body = app.create_post(None, "Hello", "World!").await;

    let err = first_error(&body);
    assert_eq!(err["message"], "Not authenticated.");
    assert_eq!(err["extensions"]["status"], 401);
    assert_eq!(app.state.posts.count().await.unwrap(), 0);
}

#[actix_web::test]
async fn test_create_post_with_expired_token_is_anonymous() {
    let app = TestApp::new();
    let (user_id, _) = app.signed_in("max@example.com").await;
    let expired = app
        .tokens
        .issue_at(&user_id, "max@example.com", Utc::now() - Duration::hours(2))
        .unwrap();

    let body = app.create_post(Some(&expired), "Hello", "World!").await;
    assert_eq!(first_error(&body)["extensions"]["status"], 401);
    assert_eq!(app.state.posts.count().await.unwrap(), 0);
}

#[actix_web::test]
async fn test_create_post_short_title_is_invalid() {
    let app = TestApp::new();
    let (_, token) = app.signed_in("max@example.com").await;

    let body = app.create_post(Some(&token), "Hi", "World!").await;
    let err = first_error(&body);
    assert_eq!(err["extensions"]["status"], 422);
    assert_eq!(err["extensions"]["data"][0]["message"], "Title is invalid.");
    assert_eq!(app.state.posts.count().await.unwrap(), 0);
}

#[actix_web::test]
async fn test_create_post_links_creator() {
    let app = TestApp::new();
    let (user_id, token) = app.signed_in("max@example.com").await;

    let body = app.create_post(Some(&token), "Hello", "World!").await;
    assert!(body.get("errors").is_none(), "unexpected errors: {body}");

    let post = &body["data"]["createPost"];
    assert_eq!(post["title"], "Hello");
    assert_eq!(post["imageUrl"], "images/cat.png");
    assert_eq!(post["creator"]["_id"], user_id.as_str());
    assert!(post["createdAt"].as_str().is_some());

    let user = app.state.users.find_by_id(&user_id).await.unwrap().unwrap();
    assert_eq!(user.posts.len(), 1);
    assert_eq!(post["_id"], user.posts[0].as_str());
}

#[actix_web::test]
async fn test_posts_lists_everything_with_creators() {
    let app = TestApp::new();
    let (_, alice) = app.signed_in("alice@example.com").await;
    let (_, bob) = app.signed_in("bob@example.com").await;

    app.create_post(Some(&alice), "First post", "Content A").await;
    app.create_post(Some(&bob), "Second post", "Content B").await;
    app.create_post(Some(&alice), "Third post", "Content C").await;

    let body = app
        .gql(
            Some(&bob),
            "{ posts { totalPosts posts { title creator { email } } } }",
            json!({}),
        )
        .await;
    assert!(body.get("errors").is_none(), "unexpected errors: {body}");

    let data = &body["data"]["posts"];
    assert_eq!(data["totalPosts"], 3);
    let posts = data["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0]["title"], "First post");
    assert_eq!(posts[0]["creator"]["email"], "alice@example.com");
    assert_eq!(posts[1]["creator"]["email"], "bob@example.com");
}

#[actix_web::test]
async fn test_posts_requires_auth() {
    let app = TestApp::new();
    let body = app.gql(None, "{ posts { totalPosts } }", json!({})).await;
    assert_eq!(first_error(&body)["extensions"]["status"], 401);
}

#[actix_web::test]
async fn test_user_posts_resolve_in_creation_order() {
    let app = TestApp::new();
    let (_, token) = app.signed_in("max@example.com").await;
    let first = app.create_post(Some(&token), "First post", "Content").await;
    app.create_post(Some(&token), "Second post", "Content").await;
    let post_id = first["data"]["createPost"]["_id"].as_str().unwrap().to_string();

    let body = app
        .gql(
            Some(&token),
            r#"query($id: ID!) { post(id: $id) { title creator { posts { title } } } }"#,
            json!({ "id": post_id }),
        )
        .await;
    assert!(body.get("errors").is_none(), "unexpected errors: {body}");

    let post = &body["data"]["post"];
    assert_eq!(post["title"], "First post");
    assert_eq!(
        post["creator"]["posts"],
        json!([{ "title": "First post" }, { "title": "Second post" }])
    );
}

#[actix_web::test]
async fn test_unknown_post_is_not_found() {
    let app = TestApp::new();
    let (_, token) = app.signed_in("max@example.com").await;

    let body = app
        .gql(Some(&token), r#"{ post(id: "missing") { title } }"#, json!({}))
        .await;
    assert_eq!(first_error(&body)["extensions"]["status"], 404);
}

#[actix_web::test]
async fn test_schema_and_health_routes() {
    let tokens = Arc::new(TokenService::new(SECRET, 3600).unwrap());
    let schema = build_schema(AppState::in_memory(tokens.clone()), &GraphQLConfig::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(schema))
            .app_data(web::Data::new(GraphQLConfig {
                playground: false,
                ..GraphQLConfig::default()
            }))
            .wrap(AuthGate::new(tokens))
            .configure(configure_routes),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), 200);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/graphql/schema").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let sdl = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(sdl.contains("type Post"));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/graphql").to_request()).await;
    assert_eq!(resp.status(), 404);
}
