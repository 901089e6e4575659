use std::time::Duration;

use askama::Template;
use axum::response::{IntoResponse, Response};
use datastar::prelude::ElementPatchMode;
use tracing::warn;
use uuid::Uuid;

use super::selectors::TOAST_STACK;
use crate::{
    application::{
        error::HttpError,
        stream::{LiveStream, StreamBuilder},
    },
    presentation::{
        admin::views::{AdminToastsTemplate, ToastView},
        views::render_fragment,
    },
};

const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(6000);

#[derive(Clone)]
pub(super) struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub text: String,
    pub ttl: Duration,
}

#[derive(Clone, Copy)]
pub(super) enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    fn as_variant(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

impl Toast {
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, text)
    }

    fn new(kind: ToastKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            ttl: DEFAULT_TOAST_TTL,
        }
    }
}

fn toasts_template(toasts: &[Toast]) -> AdminToastsTemplate {
    AdminToastsTemplate {
        toasts: toasts
            .iter()
            .map(|toast| ToastView {
                id: format!("toast-{}", toast.id),
                tone: toast.kind.as_variant(),
                text: toast.text.clone(),
                ttl_ms: toast.ttl.as_millis() as u64,
            })
            .collect(),
    }
}

pub(super) fn push_toasts(stream: &mut StreamBuilder, toasts: &[Toast]) -> Result<(), HttpError> {
    let html = render_fragment(toasts_template(toasts), "infra::http::admin::push_toasts")?;
    stream.push_patch(html, TOAST_STACK, ElementPatchMode::Replace);
    Ok(())
}

pub(super) fn live_toast(live: &LiveStream, toast: Toast) {
    live_patch(live, toasts_template(&[toast]), TOAST_STACK);
}

/// Render and send a fragment on a live stream. Render failures are logged;
/// the stream carries on.
pub(super) fn live_patch<T: Template>(live: &LiveStream, template: T, selector: &str) {
    match template.render() {
        Ok(html) => live.patch(html, selector, ElementPatchMode::Replace),
        Err(err) => warn!(
            target = "civitas::http::admin",
            selector,
            error = %err,
            "admin fragment failed to render"
        ),
    }
}

pub(super) fn datastar_replace(selector: &str, html: String) -> StreamBuilder {
    let mut stream = StreamBuilder::new();
    stream.push_patch(html, selector, ElementPatchMode::Replace);
    stream
}

/// A one-off toast response.
pub(super) fn toast_response(toast: Toast) -> Response {
    let mut stream = StreamBuilder::new();
    if let Err(err) = push_toasts(&mut stream, &[toast]) {
        return err.into_response();
    }
    stream.into_response()
}

/// Client-side navigation for datastar requests, which cannot follow redirects.
pub(super) fn redirect_script(location: &str) -> Response {
    let mut stream = StreamBuilder::new();
    let target = serde_json::to_string(location).unwrap_or_else(|_| "\"/\"".to_string());
    stream.push_script(format!("window.location.assign({target});"));
    stream.into_response()
}
