use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Extension,
};

use crate::{
    application::session::AdminSession,
    domain::topics::TOPIC_HUBS,
    presentation::{
        admin::views::{
            AdminChrome, AdminDashboardLinkView, AdminDashboardPanelView, AdminDashboardTemplate,
            AdminDashboardView,
        },
        views::render_template_response,
    },
};

use super::AdminState;

pub(super) async fn admin_dashboard(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
) -> Response {
    let chrome = AdminChrome::new(&state.base_path, "", "Dashboard", session.email.as_deref());
    let view = dashboard_view(&state);
    render_template_response(AdminDashboardTemplate { chrome, view }, StatusCode::OK)
}

fn dashboard_view(state: &AdminState) -> AdminDashboardView {
    let link = |label: &str, path: &str, caption: &str| AdminDashboardLinkView {
        label: label.to_string(),
        href: state.href(path),
        caption: caption.to_string(),
    };

    let topics = TOPIC_HUBS
        .iter()
        .map(|hub| link(hub.title, &format!("/topics/{}", hub.slug), hub.family.label()))
        .collect();

    AdminDashboardView {
        title: "Dashboard".to_string(),
        panels: vec![
            AdminDashboardPanelView {
                title: "Topic pages".to_string(),
                caption: "Featured, latest and archive items for each hub.".to_string(),
                links: topics,
            },
            AdminDashboardPanelView {
                title: "Collections".to_string(),
                caption: "Standalone listings shown across the site.".to_string(),
                links: vec![
                    link("Hot topics", "/hot-topics", ""),
                    link("Research", "/research", ""),
                    link("Events", "/events", ""),
                    link("Membership plans", "/plans", "With image galleries"),
                ],
            },
            AdminDashboardPanelView {
                title: "Requests".to_string(),
                caption: "Messages sent through the public forms.".to_string(),
                links: vec![
                    link("Callback requests", "/requests/callbacks", ""),
                    link("Membership requests", "/requests/memberships", ""),
                ],
            },
        ],
    }
}
