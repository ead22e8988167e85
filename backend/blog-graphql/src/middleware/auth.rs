//! Per-request authentication verdict and authorization helpers

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use async_graphql::Context;
use std::future::{ready, Ready};

use crate::error::ApiError;

/// Authentication verdict computed once per request by [`AuthGate`]
///
/// `is_auth() == true` only means the id came out of a verified token. It does
/// not mean the user still exists; operations that need the user re-check the
/// store.
///
/// [`AuthGate`]: super::AuthGate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    is_auth: bool,
    user_id: Option<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            is_auth: true,
            user_id: Some(user_id.into()),
        }
    }

    pub fn is_auth(&self) -> bool {
        self.is_auth
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Verify the request is authenticated and return the user id
    pub fn require_user(&self) -> Result<&str, ApiError> {
        match (self.is_auth, self.user_id.as_deref()) {
            (true, Some(id)) => Ok(id),
            _ => Err(ApiError::not_authenticated()),
        }
    }
}

/// Auth verdict attached to the GraphQL request; anonymous when absent
pub fn auth_context(ctx: &Context<'_>) -> AuthContext {
    ctx.data_opt::<AuthContext>().cloned().unwrap_or_default()
}

impl FromRequest for AuthContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_requires_login() {
        let auth = AuthContext::anonymous();
        assert!(!auth.is_auth());
        assert_eq!(auth.user_id(), None);
        assert_eq!(auth.require_user().unwrap_err().status(), 401);
    }

    #[test]
    fn test_authenticated_yields_id() {
        let auth = AuthContext::authenticated("user-123");
        assert!(auth.is_auth());
        assert_eq!(auth.require_user().unwrap(), "user-123");
    }

    #[actix_web::test]
    async fn test_extractor_defaults_to_anonymous() {
        let req = actix_web::test::TestRequest::default().to_http_request();
        let auth = AuthContext::extract(&req).await.unwrap();
        assert_eq!(auth, AuthContext::anonymous());

        req.extensions_mut().insert(AuthContext::authenticated("u1"));
        let auth = AuthContext::extract(&req).await.unwrap();
        assert_eq!(auth.user_id(), Some("u1"));
    }
}
