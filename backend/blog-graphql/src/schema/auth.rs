//! Login query and liveness probe

use async_graphql::{Context, ErrorExtensions, Object, Result as GraphQLResult, SimpleObject};

use crate::services;
use crate::state::AppState;

#[derive(SimpleObject, Clone, Debug)]
pub struct AuthData {
    pub token: String,
    pub user_id: String,
}

#[derive(Default)]
pub struct AuthQuery;

#[Object]
impl AuthQuery {
    /// Exchange credentials for a bearer token
    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> GraphQLResult<AuthData> {
        let state = ctx.data::<AppState>()?;

        let auth = services::login(state, &email, &password)
            .await
            .map_err(|e| e.extend())?;

        Ok(AuthData {
            token: auth.token,
            user_id: auth.user_id,
        })
    }

    async fn health(&self) -> String {
        "ok".to_string()
    }
}
