//! Public site router.

mod intake;
mod pages;
mod topics;

use std::sync::Arc;

use axum::{
    Router,
    extract::OriginalUri,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use datastar::prelude::ElementPatchMode;

use crate::{
    application::{
        backend::PublicApi, intake::IntakeService, reader::TopicReader, stream::StreamBuilder,
    },
    infra::assets,
    presentation::views::{PublicToastPartial, render_fragment, render_not_found_response},
};

use super::middleware::{log_responses, set_request_context};

const READING_ZONE: &str = "#reading-zone";
const SITE_TOASTS: &str = "#site-toasts";
const CONTACT_FORM: &str = "#contact-form";
const MEMBERSHIP_FORM: &str = "#membership-form";
const COUNTRY_FIELD: &str = "#country-field";
const COUNTRY_SUGGESTIONS: &str = "#country-suggestions";

#[derive(Clone)]
pub struct PublicState {
    pub api: Arc<dyn PublicApi>,
    pub reader: Arc<TopicReader>,
    pub intake: Arc<IntakeService>,
}

impl PublicState {
    pub fn new(api: Arc<dyn PublicApi>) -> Self {
        Self {
            reader: Arc::new(TopicReader::new(api.clone())),
            intake: Arc::new(IntakeService::new(api.clone())),
            api,
        }
    }
}

pub fn build_public_router(state: PublicState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::marketing))
        .route("/insights", get(pages::marketing))
        .route("/publications", get(pages::marketing))
        .route("/people", get(pages::marketing))
        .route("/education", get(pages::marketing))
        .route("/events", get(pages::events))
        .route("/membership", get(intake::membership_page))
        .route("/membership/request", post(intake::submit_membership))
        .route(
            "/contact",
            get(intake::contact_page).post(intake::submit_callback),
        )
        .route("/contact/countries", get(intake::country_suggestions))
        .route("/contact/country", get(intake::choose_country))
        .route("/topics/{slug}", get(topics::topic_hub))
        .route("/topics/{slug}/read/{id}", get(topics::open_item))
        .route("/topics/{slug}/close", get(topics::close_item))
        .route("/_health", get(health))
        .route("/static/{*path}", get(assets::serve))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn fallback(OriginalUri(uri): OriginalUri) -> Response {
    render_not_found_response(uri.path())
}

/// A single toast patched into the page, used for transient public notices.
fn toast_stream(message: impl Into<String>) -> Response {
    let html = match render_fragment(
        PublicToastPartial {
            message: message.into(),
        },
        "infra::http::public::toast_stream",
    ) {
        Ok(html) => html,
        Err(err) => return err.into_response(),
    };
    let mut stream = StreamBuilder::new();
    stream.push_patch(html, SITE_TOASTS, ElementPatchMode::Replace);
    stream.into_response()
}

fn unknown_hub(slug: &str) -> Response {
    render_not_found_response(&format!("/topics/{slug}"))
}
