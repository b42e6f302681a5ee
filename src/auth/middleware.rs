use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;

use crate::auth::token::TokenService;
use crate::error::AppError;

/// Request-level auth gate.
///
/// Extracts `Authorization: Bearer <token>`, delegates verification to the
/// [`TokenService`] it was constructed with, and injects the resolved
/// identity into request extensions. Registration and login bypass the gate.
/// A pure gate: no side effects beyond the context injection.
pub struct AuthMiddleware {
    tokens: Arc<TokenService>,
}

impl AuthMiddleware {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    tokens: Arc<TokenService>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        // Registration and login authenticate by credentials, not tokens.
        let path = req.path();
        if path == "/health"
            || path.ends_with("/tasks/register")
            || path.ends_with("/tasks/login")
        {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let header = match req.headers().get("Authorization") {
            Some(value) => value,
            None => {
                let err = AppError::Unauthorized("authorization header required".into());
                return Box::pin(async move { Err(err.into()) });
            }
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty());

        match token {
            Some(token) => match self.tokens.verify(token) {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                Err(token_err) => {
                    let err: AppError = token_err.into();
                    Box::pin(async move { Err(err.into()) })
                }
            },
            None => {
                let err = AppError::Unauthorized("invalid token format".into());
                Box::pin(async move { Err(err.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::{AuthenticatedUser, TokenKind};
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};
    use uuid::Uuid;

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({ "email": user.email }))
    }

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(Some("middleware_test_secret".into())))
    }

    #[actix_rt::test]
    async fn test_missing_header_is_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(tokens()))
                .route("/api/tasks", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/tasks").to_request();
        let result = test::try_call_service(&app, req).await;
        let err = result.expect_err("request without a token must be rejected");
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_non_bearer_header_is_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(tokens()))
                .route("/api/tasks", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/tasks")
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_request();
        let result = test::try_call_service(&app, req).await;
        let err = result.expect_err("malformed auth header must be rejected");
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_valid_token_reaches_handler() {
        let tokens = tokens();
        let token = tokens
            .issue(Uuid::new_v4(), "user@example.com", TokenKind::Access)
            .unwrap();

        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(tokens.clone()))
                .route("/api/tasks", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/tasks")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["email"], "user@example.com");
    }

    #[actix_rt::test]
    async fn test_login_path_bypasses_gate() {
        let app = test::init_service(
            App::new().wrap(AuthMiddleware::new(tokens())).route(
                "/api/tasks/login",
                web::post().to(|| async { HttpResponse::Ok().finish() }),
            ),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/tasks/login").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_missing_secret_is_server_error_not_unauthorized() {
        let unconfigured = Arc::new(TokenService::new(None));
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(unconfigured))
                .route("/api/tasks", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/tasks")
            .insert_header(("Authorization", "Bearer some.token.here"))
            .to_request();
        let result = test::try_call_service(&app, req).await;
        let err = result.expect_err("missing secret must fail the request");
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
