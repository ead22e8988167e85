//! Bearer-token auth gate for every incoming request
//!
//! The gate never rejects. It resolves an [`AuthContext`] from the
//! `Authorization` header and leaves the accept/deny decision to each
//! operation, so public operations (`createUser`, `login`) share the pipeline
//! with protected ones.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderValue, AUTHORIZATION},
    Error, HttpMessage,
};
use crypto_core::jwt::TokenService;
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::sync::Arc;
use tracing::debug;

use super::auth::AuthContext;

/// Auth gate middleware
pub struct AuthGate {
    tokens: Arc<TokenService>,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateService {
            service,
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct AuthGateService<S> {
    service: S,
    tokens: Arc<TokenService>,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let auth = authenticate(req.headers().get(AUTHORIZATION), &self.tokens);
        req.extensions_mut().insert(auth);

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}

/// Resolve the auth verdict for one `Authorization` header value
///
/// Missing header, wrong scheme, bad signature and expiry all collapse to
/// anonymous.
pub fn authenticate(header: Option<&HeaderValue>, tokens: &TokenService) -> AuthContext {
    let Some(header) = header else {
        return AuthContext::anonymous();
    };

    let Ok(value) = header.to_str() else {
        debug!("Authorization header is not valid UTF-8");
        return AuthContext::anonymous();
    };

    let Some(token) = value.strip_prefix("Bearer ").map(str::trim) else {
        debug!("Authorization header does not use Bearer scheme");
        return AuthContext::anonymous();
    };

    if token.is_empty() {
        return AuthContext::anonymous();
    }

    match tokens.verify(token) {
        Ok(claims) => AuthContext::authenticated(claims.user_id),
        Err(e) => {
            debug!(reason = %e, "Bearer token rejected");
            AuthContext::anonymous()
        }
    }
}
