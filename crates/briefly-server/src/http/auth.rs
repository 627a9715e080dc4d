//! Bearer-token middleware.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use briefly_core::UserContext;

use crate::identity::IdentityProvider;

use super::JsonResponse;

/// Authentication middleware. Skips `/health`; every other route requires a
/// verified caller, whose [`UserContext`] is injected into the request
/// extensions for the handlers.
///
/// With `auth_disabled` the header is not required and the provider (a
/// static one) decides the identity.
pub async fn check(
    mut req: Request,
    next: Next,
    identity: Arc<dyn IdentityProvider>,
    auth_disabled: bool,
) -> Response {
    if req.uri().path() == "/health" {
        return next.run(req).await;
    }

    match resolve_identity(&req, identity.as_ref(), auth_disabled).await {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(response) => response,
    }
}

/// Establishes the caller identity for one request, or the response that
/// ends it: 401 for a missing or invalid token, 502 when the provider
/// cannot be consulted.
///
/// The token is read out of the request before the returned future is
/// built, so the future does not borrow the request (whose body is not
/// `Sync`) across an await and stays `Send`.
fn resolve_identity<'a>(
    req: &Request,
    identity: &'a dyn IdentityProvider,
    auth_disabled: bool,
) -> impl std::future::Future<Output = Result<UserContext, Response>> + Send + 'a {
    let token = if auth_disabled {
        Ok(String::new())
    } else {
        match bearer_token(req) {
            Some(token) => Ok(token.to_string()),
            None => Err(unauthorized("Missing bearer token")),
        }
    };

    async move {
        match identity.verify(&token?).await {
            Ok(Some(user)) => {
                let mut ctx = UserContext::new(user.id);
                if let Some(email) = user.email {
                    ctx = ctx.with_email(email);
                }
                Ok(ctx)
            }
            Ok(None) => Err(unauthorized("Invalid or expired token")),
            Err(e) => {
                tracing::error!("Token verification failed: {}", e);
                Err((
                    StatusCode::BAD_GATEWAY,
                    Json(JsonResponse::<()>::err("Identity provider unavailable")),
                )
                    .into_response())
            }
        }
    }
}

fn unauthorized(msg: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(JsonResponse::<()>::err(msg)),
    )
        .into_response()
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get("authorization")?.to_str().ok()?;
    value.strip_prefix("Bearer ")
}
