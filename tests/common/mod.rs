// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
    Router,
};
use hotel_compare::config::Config;
use hotel_compare::middleware::SESSION_COOKIE;
use hotel_compare::routes::create_router;
use hotel_compare::services::HotelCatalog;
use hotel_compare::session::SessionRegistry;
use hotel_compare::store::MemoryBackend;
use hotel_compare::AppState;
use std::sync::Arc;
use tower::ServiceExt;

#[allow(dead_code)]
pub const PASSWORD: &str = "hunter22";

/// Small catalog: two Paris hotels (one pet-friendly) and one in Rome.
#[allow(dead_code)]
pub const TEST_HOTELS: &str = r#"[
    {
        "id": "h1", "name": "Grand Palace", "location": "Paris, France",
        "image": "https://img.example/h1.jpg", "rating": 4.8, "petFriendly": true,
        "prices": [
            {"website": "Booking.com", "price": 420.0},
            {"website": "Expedia", "price": 399.0}
        ]
    },
    {
        "id": "h2", "name": "Riverside Inn", "location": "Paris, France",
        "image": "https://img.example/h2.jpg", "rating": 4.0,
        "prices": [{"website": "Hotels.com", "price": 180.0}]
    },
    {
        "id": "h3", "name": "Colosseum View", "location": "Rome, Italy",
        "image": "https://img.example/h3.jpg", "rating": 4.4,
        "prices": [{"website": "Agoda", "price": 210.0}]
    }
]"#;

/// Router, shared state and the in-memory backend behind every session.
pub struct TestApp {
    pub router: Router,
    #[allow(dead_code)]
    pub state: Arc<AppState>,
    #[allow(dead_code)]
    pub backend: MemoryBackend,
}

/// Create a test app over an in-memory session store.
pub fn create_test_app() -> TestApp {
    let backend = MemoryBackend::new();
    let catalog = HotelCatalog::load_from_json(TEST_HOTELS).expect("Test catalog should parse");

    let state = Arc::new(AppState {
        config: Config::test_default(),
        sessions: SessionRegistry::new(Arc::new(backend.clone())),
        catalog,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        backend,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[allow(dead_code)]
    pub async fn post_form(&self, uri: &str, cookie: &str, form: &str) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::COOKIE, cookie)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(form.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    /// Open a fresh session and return its `name=value` cookie pair.
    pub async fn new_session(&self) -> String {
        let response = self.get("/", None).await;
        session_cookie(&response).expect("First visit should set a session cookie")
    }

    /// Register an account, open a session and sign in through the modal.
    #[allow(dead_code)]
    pub async fn signed_in(&self, email: &str, full_name: Option<&str>) -> String {
        self.backend.add_account(email, PASSWORD, full_name);
        let cookie = self.new_session().await;
        let form = format!(
            "email={}&password={}&next=%2Fprofile",
            email.replace('@', "%40"),
            PASSWORD
        );
        let response = self.post_form("/auth/sign-in", &cookie, &form).await;
        assert!(response.status().is_redirection());
        cookie
    }
}

/// The session cookie set by a response, as a `name=value` pair.
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{SESSION_COOKIE}=")))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

#[allow(dead_code)]
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[allow(dead_code)]
pub async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
