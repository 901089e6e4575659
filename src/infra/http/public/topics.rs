//! Topic hubs and the reading panel.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use datastar::prelude::ElementPatchMode;
use serde_json::json;

use crate::{
    application::stream::StreamBuilder,
    domain::topics::find_hub,
    presentation::views::{
        LayoutContext, ReadingTemplate, ReadingView, SiteChrome, TopicPageView, TopicTemplate,
        render_fragment, render_template_response,
    },
};

use super::{PublicState, READING_ZONE, toast_stream, unknown_hub};
use crate::infra::http::is_datastar_request;

const SOURCE: &str = "infra::http::public::topics";

const SCROLL_TO_READING: &str =
    "document.getElementById('reading-zone')?.scrollIntoView({behavior: 'smooth', block: 'start'});";

pub(super) async fn topic_hub(
    State(state): State<PublicState>,
    Path(slug): Path<String>,
) -> Response {
    let Some(hub) = find_hub(&slug) else {
        return unknown_hub(&slug);
    };

    let topic = state.reader.load(hub).await;
    let page = TopicPageView::new(
        hub,
        &topic.buckets.featured,
        &topic.buckets.latest,
        &topic.buckets.archive,
        topic.error.clone(),
    );
    let view = LayoutContext::new(
        SiteChrome::for_path(&format!("/topics/{}", hub.slug), hub.title)
            .with_description(hub.intro),
        page,
    );
    render_template_response(TopicTemplate { view }, StatusCode::OK)
}

/// Patch the reading zone with one item. The page URL does not change;
/// a plain navigation falls back to the hub itself.
pub(super) async fn open_item(
    State(state): State<PublicState>,
    Path((slug, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let Some(hub) = find_hub(&slug) else {
        return unknown_hub(&slug);
    };
    if !is_datastar_request(&headers) {
        return Redirect::to(&format!("/topics/{}", hub.slug)).into_response();
    }

    let mut topic = state.reader.load(hub).await;
    let reading = match topic.open(&id) {
        Ok(item) => ReadingView::from_item(hub.slug, item),
        Err(err) => {
            let message = topic.error.clone().unwrap_or_else(|| err.banner());
            return toast_stream(message);
        }
    };

    let html = match render_fragment(
        ReadingTemplate {
            reading: Some(reading),
        },
        SOURCE,
    ) {
        Ok(html) => html,
        Err(err) => return err.into_response(),
    };

    let mut stream = StreamBuilder::new();
    stream.push_patch(html, READING_ZONE, ElementPatchMode::Replace);
    stream.push_signals(&json!({ "openId": id }).to_string());
    stream.push_script(SCROLL_TO_READING.to_string());
    stream.into_response()
}

pub(super) async fn close_item(Path(slug): Path<String>, headers: HeaderMap) -> Response {
    let Some(hub) = find_hub(&slug) else {
        return unknown_hub(&slug);
    };
    if !is_datastar_request(&headers) {
        return Redirect::to(&format!("/topics/{}", hub.slug)).into_response();
    }

    let html = match render_fragment(ReadingTemplate { reading: None }, SOURCE) {
        Ok(html) => html,
        Err(err) => return err.into_response(),
    };
    let mut stream = StreamBuilder::new();
    stream.push_patch(html, READING_ZONE, ElementPatchMode::Replace);
    stream.push_signals(&json!({ "openId": "" }).to_string());
    stream.into_response()
}
