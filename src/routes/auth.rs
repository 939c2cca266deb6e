// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth modal routes: open/close, email sign-in, sign-up, sign-out.
//!
//! Every handler answers with a redirect back to the page the form was
//! posted from. Outcomes surface as notifications on that next page view.

use crate::session::Session;
use crate::store::{SignUpOutcome, StoreError};
use crate::AppState;
use axum::{response::Redirect, routing::post, Extension, Form, Router};
use serde::Deserialize;
use std::sync::Arc;
use validator::{Validate, ValidationErrors};

pub const SIGNED_IN: &str = "Signed in successfully";
pub const SIGNED_UP: &str = "Account created successfully";
pub const CONFIRM_EMAIL: &str = "Check your email to confirm your account";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const SIGN_IN_FAILED: &str = "Failed to sign in";
pub const SIGN_UP_FAILED: &str = "Failed to create account";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/modal/open", post(open_modal))
        .route("/auth/modal/close", post(close_modal))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-out", post(sign_out))
}

#[derive(Debug, Deserialize)]
pub struct ModalForm {
    #[serde(default)]
    pub next: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignInForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub next: String,
}

/// Only same-site absolute paths are followed; anything else goes home.
pub fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}

/// First validation message, ordered by field name so output is stable.
fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid input".to_string())
}

async fn open_modal(
    Extension(session): Extension<Arc<Session>>,
    Form(form): Form<ModalForm>,
) -> Redirect {
    session.set_show_auth(true);
    Redirect::to(safe_next(&form.next))
}

async fn close_modal(
    Extension(session): Extension<Arc<Session>>,
    Form(form): Form<ModalForm>,
) -> Redirect {
    session.set_show_auth(false);
    Redirect::to(safe_next(&form.next))
}

async fn sign_in(
    Extension(session): Extension<Arc<Session>>,
    Form(form): Form<SignInForm>,
) -> Redirect {
    let next = safe_next(&form.next);
    let notifier = session.controller().notifier();

    if let Err(errors) = form.validate() {
        notifier.error(validation_message(&errors));
        return Redirect::to(next);
    }

    match session
        .store()
        .sign_in_with_password(form.email.trim(), &form.password)
        .await
    {
        Ok(identity) => {
            tracing::info!(user_id = %identity.id, "User signed in");
            session.set_show_auth(false);
            notifier.success(SIGNED_IN);
        }
        Err(StoreError::InvalidCredentials) => {
            tracing::debug!("Sign-in rejected: invalid credentials");
            notifier.error(INVALID_CREDENTIALS);
        }
        Err(e) => {
            tracing::error!(error = %e, "Sign-in failed");
            notifier.error(SIGN_IN_FAILED);
        }
    }

    Redirect::to(next)
}

async fn sign_up(
    Extension(session): Extension<Arc<Session>>,
    Form(form): Form<SignUpForm>,
) -> Redirect {
    let next = safe_next(&form.next);
    let notifier = session.controller().notifier();

    if let Err(errors) = form.validate() {
        notifier.error(validation_message(&errors));
        return Redirect::to(next);
    }

    let full_name = form
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    match session
        .store()
        .sign_up(form.email.trim(), &form.password, full_name)
        .await
    {
        Ok(SignUpOutcome::SignedIn(identity)) => {
            tracing::info!(user_id = %identity.id, "User signed up");
            session.set_show_auth(false);
            notifier.success(SIGNED_UP);
        }
        Ok(SignUpOutcome::ConfirmationRequired) => {
            tracing::info!("Sign-up awaiting email confirmation");
            session.set_show_auth(false);
            notifier.success(CONFIRM_EMAIL);
        }
        Err(StoreError::Api { status, message }) if status < 500 => {
            tracing::debug!(status, message = %message, "Sign-up rejected");
            notifier.error(message);
        }
        Err(e) => {
            tracing::error!(error = %e, "Sign-up failed");
            notifier.error(SIGN_UP_FAILED);
        }
    }

    Redirect::to(next)
}

/// Navigation home comes from the `SignedOut` event; a failed sign-out
/// stays on the current page.
async fn sign_out(
    Extension(session): Extension<Arc<Session>>,
    Form(form): Form<ModalForm>,
) -> Redirect {
    match session.controller().sign_out().await {
        Ok(()) => Redirect::to("/"),
        Err(_) => Redirect::to(safe_next(&form.next)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next("/profile"), "/profile");
        assert_eq!(safe_next("/explore?location=Paris"), "/explore?location=Paris");
        assert_eq!(safe_next(""), "/");
        assert_eq!(safe_next("https://evil.example"), "/");
        assert_eq!(safe_next("//evil.example"), "/");
        assert_eq!(safe_next("/\\evil.example"), "/");
    }

    #[test]
    fn test_sign_in_form_validation() {
        let form = SignInForm {
            email: "not-an-email".to_string(),
            password: "hunter22".to_string(),
            next: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(validation_message(&errors), "Please enter a valid email address");

        let form = SignInForm {
            email: "ana@example.com".to_string(),
            password: "short".to_string(),
            next: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(validation_message(&errors), "Password must be at least 6 characters");

        let form = SignInForm {
            email: "ana@example.com".to_string(),
            password: "hunter22".to_string(),
            next: String::new(),
        };
        assert!(form.validate().is_ok());
    }
}
