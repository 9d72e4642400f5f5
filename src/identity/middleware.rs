//! Middleware that resolves the caller's identity before protected handlers run.

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    AppState, Error,
    identity::{IdentityResolver, SESSION_COOKIE},
};

impl FromRef<AppState> for IdentityResolver {
    fn from_ref(state: &AppState) -> Self {
        state.identity_resolver.clone()
    }
}

/// Middleware function that resolves the session cookie into an [Identity](crate::Identity).
///
/// The identity is placed into the request and the request executed normally
/// if the session is valid, otherwise a 401 Unauthorized JSON error is returned
/// and the handler never runs.
///
/// **Note**: Route handlers can use the function argument `Extension(identity): Extension<Identity>` to receive the identity.
pub async fn identity_guard(
    State(resolver): State<IdentityResolver>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let session_cookie = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_owned());

    match resolver.resolve(session_cookie.as_deref()).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(error) => Error::Unauthorized(error).into_response(),
    }
}
