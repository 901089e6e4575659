//! Inbound request queues. These are read straight from the backend on every
//! render; nothing is held per session.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use civitas_api_types::{CallbackRequest, MembershipRequest, RequestStatus};
use serde::Deserialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};
use tracing::warn;

use super::{
    AdminState,
    selectors::REQUESTS_PANEL,
    shared::{Toast, datastar_replace, push_toasts},
};
use crate::{
    application::{backend::BackendError, session::AdminSession},
    presentation::{
        admin::views::{
            AdminChrome, AdminRequestsPanelTemplate, AdminRequestsTemplate, BannerView,
            RequestRowView, RequestsPanelView, StatusOptionView,
        },
        views::{render_fragment, render_template_response},
    },
};

const SOURCE: &str = "infra::http::admin::requests";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Queue {
    Callbacks,
    Memberships,
}

impl Queue {
    fn path(self) -> &'static str {
        match self {
            Queue::Callbacks => "/requests/callbacks",
            Queue::Memberships => "/requests/memberships",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Queue::Callbacks => "Callback requests",
            Queue::Memberships => "Membership requests",
        }
    }

    fn kind(self) -> &'static str {
        match self {
            Queue::Callbacks => "callback",
            Queue::Memberships => "membership",
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusQuery {
    status: String,
}

pub(super) async fn callbacks_page(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
) -> Response {
    queue_page(&state, &session, Queue::Callbacks).await
}

pub(super) async fn memberships_page(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
) -> Response {
    queue_page(&state, &session, Queue::Memberships).await
}

pub(super) async fn refresh_callbacks(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
) -> Response {
    panel_stream(&state, &session, Queue::Callbacks, None).await
}

pub(super) async fn refresh_memberships(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
) -> Response {
    panel_stream(&state, &session, Queue::Memberships, None).await
}

pub(super) async fn set_callback_status(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Response {
    let Ok(status) = query.status.parse::<RequestStatus>() else {
        return panel_stream(
            &state,
            &session,
            Queue::Callbacks,
            Some(Toast::error("Unknown status.")),
        )
        .await;
    };
    let toast = match state
        .requests
        .set_callback_status(&session.token, &id, status)
        .await
    {
        Ok(_) => Toast::success(format!("Marked as {}.", status.as_str())),
        Err(err) => failure_toast(Queue::Callbacks, &err),
    };
    panel_stream(&state, &session, Queue::Callbacks, Some(toast)).await
}

pub(super) async fn delete_callback(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
) -> Response {
    let outcome = state.requests.delete_callback(&session.token, &id).await;
    let toast = deleted_toast(Queue::Callbacks, outcome);
    panel_stream(&state, &session, Queue::Callbacks, Some(toast)).await
}

pub(super) async fn delete_membership(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
) -> Response {
    let outcome = state.requests.delete_membership(&session.token, &id).await;
    let toast = deleted_toast(Queue::Memberships, outcome);
    panel_stream(&state, &session, Queue::Memberships, Some(toast)).await
}

fn deleted_toast(queue: Queue, outcome: Result<(), BackendError>) -> Toast {
    match outcome {
        Ok(()) => Toast::success("Request deleted."),
        Err(err) => failure_toast(queue, &err),
    }
}

fn failure_toast(queue: Queue, err: &BackendError) -> Toast {
    warn!(
        target = "civitas::http::admin::requests",
        queue = queue.kind(),
        error = %err,
        "request queue mutation failed"
    );
    Toast::error(err.user_message())
}

async fn queue_page(state: &AdminState, session: &AdminSession, queue: Queue) -> Response {
    let panel = load_panel(state, session, queue).await;
    let template = AdminRequestsTemplate {
        chrome: AdminChrome::new(
            &state.base_path,
            queue.path(),
            queue.title(),
            session.email.as_deref(),
        ),
        panel,
    };
    render_template_response(template, StatusCode::OK)
}

async fn panel_stream(
    state: &AdminState,
    session: &AdminSession,
    queue: Queue,
    toast: Option<Toast>,
) -> Response {
    let panel = load_panel(state, session, queue).await;
    let html = match render_fragment(AdminRequestsPanelTemplate { panel }, SOURCE) {
        Ok(html) => html,
        Err(err) => return err.into_response(),
    };
    let mut stream = datastar_replace(REQUESTS_PANEL, html);
    if let Some(toast) = toast
        && let Err(err) = push_toasts(&mut stream, &[toast])
    {
        return err.into_response();
    }
    stream.into_response()
}

/// Fetch the queue. A failed fetch renders as an empty queue with a banner.
async fn load_panel(state: &AdminState, session: &AdminSession, queue: Queue) -> RequestsPanelView {
    let base = state.href(queue.path());
    let rows = match queue {
        Queue::Callbacks => state.requests.callbacks(&session.token).await.map(|mut items| {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            items.iter().map(|item| callback_row(item, &base)).collect()
        }),
        Queue::Memberships => state.requests.memberships(&session.token).await.map(|mut items| {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            items.iter().map(|item| membership_row(item, &base)).collect()
        }),
    };
    let (rows, banner) = match rows {
        Ok(rows) => (rows, None),
        Err(err) => {
            warn!(
                target = "civitas::http::admin::requests",
                queue = queue.kind(),
                error = %err,
                "request queue could not be loaded"
            );
            (
                Vec::new(),
                Some(BannerView {
                    message: err.user_message(),
                    is_error: true,
                }),
            )
        }
    };

    RequestsPanelView {
        heading: queue.title().to_string(),
        kind: queue.kind(),
        refresh_action: format!("{base}/refresh"),
        empty_message: "No requests yet.".to_string(),
        rows,
        banner,
    }
}

fn callback_row(item: &CallbackRequest, base: &str) -> RequestRowView {
    let mut details = vec![
        ("Reason".to_string(), item.reason.clone()),
        ("Country".to_string(), item.country.clone()),
    ];
    push_optional(&mut details, "Email", item.email.as_deref());
    push_optional(&mut details, "Phone", item.phone.as_deref());

    RequestRowView {
        id: item.id.clone(),
        heading: item.subject.clone(),
        details,
        message: non_blank(item.message.as_deref()),
        received: item.created_at.as_deref().map(received_label),
        status: item.status.as_str(),
        statuses: RequestStatus::ALL
            .into_iter()
            .map(|status| StatusOptionView {
                value: status.as_str(),
                label: status_label(status),
                selected: status == item.status,
            })
            .collect(),
        status_action: Some(format!("{base}/items/{}/status", item.id)),
        delete_action: format!("{base}/items/{}/delete", item.id),
    }
}

fn membership_row(item: &MembershipRequest, base: &str) -> RequestRowView {
    let mut details = vec![("Plan".to_string(), item.plan.clone())];
    push_optional(&mut details, "Organization", item.organization.as_deref());
    push_optional(&mut details, "Email", item.email.as_deref());
    push_optional(&mut details, "Phone", item.phone.as_deref());

    RequestRowView {
        id: item.id.clone(),
        heading: item.full_name.clone(),
        details,
        message: non_blank(item.message.as_deref()),
        received: item.created_at.as_deref().map(received_label),
        status: item.status.as_str(),
        statuses: Vec::new(),
        status_action: None,
        delete_action: format!("{base}/items/{}/delete", item.id),
    }
}

fn status_label(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::New => "New",
        RequestStatus::Contacted => "Contacted",
        RequestStatus::Closed => "Closed",
    }
}

fn push_optional(details: &mut Vec<(String, String)>, label: &str, value: Option<&str>) {
    if let Some(value) = non_blank(value) {
        details.push((label.to_string(), value));
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// RFC 3339 timestamps render as a short UTC date; anything else is shown as sent.
fn received_label(raw: &str) -> String {
    let format = format_description!("[day padding:none] [month repr:short] [year], [hour]:[minute] UTC");
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .and_then(|at| at.to_offset(time::UtcOffset::UTC).format(format).ok())
        .unwrap_or_else(|| raw.to_string())
}
