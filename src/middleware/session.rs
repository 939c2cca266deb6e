// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie middleware.
//!
//! Resolves the `hc_session` cookie to a live session, creating one for
//! new visitors, and makes it available to handlers as an extension.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "hc_session";

/// Attach the visitor's session to the request.
pub async fn attach_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.get(cookie.value()));

    let (session, jar) = match existing {
        Some(session) => (session, jar),
        None => {
            let session = match state.sessions.create() {
                Ok(session) => session,
                Err(e) => return AppError::from(e).into_response(),
            };
            let cookie = Cookie::build((SESSION_COOKIE, session.id().to_string()))
                .path("/")
                .http_only(true)
                .secure(state.config.cookie_secure)
                .same_site(SameSite::Lax)
                .build();
            (session, jar.add(cookie))
        }
    };

    request.extensions_mut().insert(session);
    (jar, next.run(request).await).into_response()
}
