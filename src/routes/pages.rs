// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page routes: the route table, auth gating and page templates.

use crate::error::{AppError, Result};
use crate::models::{Booking, Pet, PetType, SearchLocation, SortedHotel, User};
use crate::services::SearchQuery;
use crate::session::{Notification, Session, SessionState};
use crate::time_utils::format_stay_date;
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use std::sync::Arc;

const FEATURED_HOTELS: usize = 3;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(HOME.path, get(home))
        .route(EXPLORE.path, get(explore))
        .route(PROFILE.path, get(profile))
        .route(REWARDS.path, get(rewards))
}

// ─── Route Table ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Enter/exit animation: pages slide in from `+offset` and out to `-offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub axis: Axis,
    pub offset: i32,
}

impl Transition {
    pub fn enter_x(&self) -> i32 {
        if self.axis == Axis::X {
            self.offset
        } else {
            0
        }
    }

    pub fn enter_y(&self) -> i32 {
        if self.axis == Axis::Y {
            self.offset
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Explore,
    Profile,
    Rewards,
}

#[derive(Debug, Clone, Copy)]
pub struct PageRoute {
    pub path: &'static str,
    pub page: Page,
    pub transition: Transition,
    /// Shown instead of the page when signed out; `None` for public pages
    pub sign_in_prompt: Option<&'static str>,
}

const SLIDE_Y: Transition = Transition {
    axis: Axis::Y,
    offset: 20,
};
const SLIDE_X: Transition = Transition {
    axis: Axis::X,
    offset: 20,
};

pub const HOME: PageRoute = PageRoute {
    path: "/",
    page: Page::Home,
    transition: SLIDE_Y,
    sign_in_prompt: None,
};
pub const EXPLORE: PageRoute = PageRoute {
    path: "/explore",
    page: Page::Explore,
    transition: SLIDE_X,
    sign_in_prompt: None,
};
pub const PROFILE: PageRoute = PageRoute {
    path: "/profile",
    page: Page::Profile,
    transition: SLIDE_Y,
    sign_in_prompt: Some("Please sign in to view your profile"),
};
pub const REWARDS: PageRoute = PageRoute {
    path: "/rewards",
    page: Page::Rewards,
    transition: SLIDE_Y,
    sign_in_prompt: Some("Please sign in to view your rewards"),
};

pub const ROUTES: [PageRoute; 4] = [HOME, EXPLORE, PROFILE, REWARDS];

/// What a route renders for a given session state.
#[derive(Debug, Clone, PartialEq)]
pub enum View<'a> {
    Page(Page),
    SignInPrompt(&'static str),
    /// Gated page with the user it is rendered for
    UserPage(Page, &'a User),
}

/// Decide what `route` renders. Gated pages need an authenticated user.
pub fn resolve<'a>(route: &PageRoute, state: &'a SessionState) -> View<'a> {
    match (route.sign_in_prompt, state.user()) {
        (None, _) => View::Page(route.page),
        (Some(_), Some(user)) => View::UserPage(route.page, user),
        (Some(prompt), None) => View::SignInPrompt(prompt),
    }
}

// ─── Layout ──────────────────────────────────────────────────

/// Shared chrome: navbar, toasts, auth modal, transition.
pub struct Layout {
    pub user: Option<User>,
    pub notifications: Vec<Notification>,
    pub show_auth: bool,
    pub path: &'static str,
    pub transition: Transition,
}

/// Wait for the session to settle and follow any pending navigation.
///
/// Returns the redirect to send instead of the page, if any.
async fn enter(
    session: &Session,
    route: &PageRoute,
) -> std::result::Result<(Layout, SessionState), Redirect> {
    let controller = session.controller();
    controller.settled().await;

    if let Some(target) = controller.take_redirect() {
        if target != route.path {
            tracing::debug!(from = route.path, to = %target, "Following session navigation");
            return Err(Redirect::to(&target));
        }
    }

    let state = controller.state();
    let layout = Layout {
        user: state.user().cloned(),
        notifications: controller.take_notifications(),
        show_auth: session.show_auth(),
        path: route.path,
        transition: route.transition,
    };
    Ok((layout, state))
}

#[derive(Template, WebTemplate)]
#[template(path = "sign_in_prompt.html")]
pub struct SignInPromptTemplate {
    pub layout: Layout,
    pub message: &'static str,
}

fn sign_in_prompt(layout: Layout, route: &PageRoute) -> Response {
    SignInPromptTemplate {
        layout,
        message: route.sign_in_prompt.unwrap_or("Please sign in"),
    }
    .into_response()
}

// ─── Hotel Cards ─────────────────────────────────────────────

pub struct StepView {
    pub website: String,
    pub price: String,
    pub is_best: bool,
}

pub struct HotelCard {
    pub id: String,
    pub name: String,
    pub location: String,
    pub image: String,
    pub rating: f64,
    pub best_price: String,
    pub best_website: String,
    pub discount: Option<String>,
    pub pet_note: Option<String>,
    pub steps: Vec<StepView>,
}

fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

impl From<SortedHotel> for HotelCard {
    fn from(sorted: SortedHotel) -> Self {
        let pet_note = match (sorted.hotel.pet_friendly, sorted.hotel.pet_fee) {
            (true, Some(fee)) => Some(format!("Pets welcome ({} fee)", money(fee))),
            (true, None) => Some("Pets welcome".to_string()),
            (false, _) => None,
        };

        Self {
            steps: sorted
                .comparison_steps
                .iter()
                .map(|step| StepView {
                    website: step.website.clone(),
                    price: money(step.seasonal_price.unwrap_or(step.price)),
                    is_best: step.is_best,
                })
                .collect(),
            best_price: money(sorted.best_price),
            best_website: sorted.best_website,
            discount: sorted.seasonal_discount.map(|d| format!("{:.0}%", d)),
            pet_note,
            id: sorted.hotel.id,
            name: sorted.hotel.name,
            location: sorted.hotel.location,
            image: sorted.hotel.image,
            rating: sorted.hotel.rating,
        }
    }
}

// ─── Home ────────────────────────────────────────────────────

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub featured: Vec<HotelCard>,
}

async fn home(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<Session>>,
) -> Response {
    let (layout, _) = match enter(&session, &HOME).await {
        Ok(entered) => entered,
        Err(redirect) => return redirect.into_response(),
    };

    let featured = state
        .catalog
        .search(&SearchQuery::default())
        .into_iter()
        .take(FEATURED_HOTELS)
        .map(HotelCard::from)
        .collect();

    HomeTemplate { layout, featured }.into_response()
}

// ─── Explore ─────────────────────────────────────────────────

/// Search form fields. Number inputs arrive as text: a cleared field is
/// submitted as an empty value.
#[derive(Deserialize)]
struct ExploreQuery {
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    adults: Option<String>,
    #[serde(default)]
    pets: Option<String>,
}

/// Parse a count field, using `default` when it is missing or blank.
fn count_param(name: &str, value: Option<&str>, default: u32) -> Result<u32> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| AppError::BadRequest(format!("{} must be a whole number", name))),
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "explore.html")]
pub struct ExploreTemplate {
    pub layout: Layout,
    pub location: String,
    pub adults: u32,
    pub pets: u32,
    pub suggestions: Vec<SearchLocation>,
    pub results: Vec<HotelCard>,
}

async fn explore(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<Session>>,
    Query(params): Query<ExploreQuery>,
) -> Result<Response> {
    let adults = count_param("adults", params.adults.as_deref(), 2)?.max(1);
    let pets = count_param("pets", params.pets.as_deref(), 0)?;

    let (layout, _) = match enter(&session, &EXPLORE).await {
        Ok(entered) => entered,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let mut query = SearchQuery {
        location: params.location.clone(),
        ..Default::default()
    };
    query.guests.adults = adults;
    if pets > 0 {
        query.guests.pets.push(Pet {
            id: "search".to_string(),
            pet_type: PetType::Other,
            count: pets,
        });
    }

    let results = state
        .catalog
        .search(&query)
        .into_iter()
        .map(HotelCard::from)
        .collect();

    Ok(ExploreTemplate {
        layout,
        location: params.location.unwrap_or_default(),
        adults,
        pets,
        suggestions: state.catalog.locations(""),
        results,
    }
    .into_response())
}

// ─── Profile ─────────────────────────────────────────────────

pub struct BookingView {
    pub hotel_name: String,
    pub check_in: String,
    pub check_out: String,
    pub nights: i64,
    pub guests: String,
    pub total_price: String,
    pub status: &'static str,
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        let mut guests = format!("{} guests", booking.guests.total_guests());
        let pets = booking.guests.pet_count();
        if pets > 0 {
            guests.push_str(&format!(", {} pets", pets));
        }

        Self {
            hotel_name: booking.hotel_name.clone(),
            check_in: format_stay_date(booking.check_in),
            check_out: format_stay_date(booking.check_out),
            nights: booking.nights(),
            guests,
            total_price: money(booking.total_price),
            status: booking.status.as_str(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub user: User,
    pub bookings: Vec<BookingView>,
}

async fn profile(Extension(session): Extension<Arc<Session>>) -> Response {
    let (layout, state) = match enter(&session, &PROFILE).await {
        Ok(entered) => entered,
        Err(redirect) => return redirect.into_response(),
    };

    match resolve(&PROFILE, &state) {
        View::UserPage(_, user) => {
            let mut bookings: Vec<&Booking> = user.bookings.iter().collect();
            bookings.sort_by(|a, b| b.check_in.cmp(&a.check_in));

            ProfileTemplate {
                bookings: bookings.into_iter().map(BookingView::from).collect(),
                user: user.clone(),
                layout,
            }
            .into_response()
        }
        _ => sign_in_prompt(layout, &PROFILE),
    }
}

// ─── Rewards ─────────────────────────────────────────────────

pub struct RewardTier {
    pub name: &'static str,
    pub threshold: u32,
    pub perk: &'static str,
}

static TIERS: [RewardTier; 3] = [
    RewardTier {
        name: "Explorer",
        threshold: 0,
        perk: "member-only prices",
    },
    RewardTier {
        name: "Voyager",
        threshold: 10,
        perk: "5% back on every stay",
    },
    RewardTier {
        name: "Globetrotter",
        threshold: 25,
        perk: "10% back and free late checkout",
    },
];

#[derive(Template, WebTemplate)]
#[template(path = "rewards.html")]
pub struct RewardsTemplate {
    pub layout: Layout,
    pub tiers: &'static [RewardTier],
}

async fn rewards(Extension(session): Extension<Arc<Session>>) -> Response {
    let (layout, state) = match enter(&session, &REWARDS).await {
        Ok(entered) => entered,
        Err(redirect) => return redirect.into_response(),
    };

    match resolve(&REWARDS, &state) {
        View::SignInPrompt(_) => sign_in_prompt(layout, &REWARDS),
        _ => RewardsTemplate {
            layout,
            tiers: &TIERS,
        }
        .into_response(),
    }
}
