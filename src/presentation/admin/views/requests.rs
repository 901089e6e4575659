use askama::Template;

use super::{AdminChrome, BannerView};

#[derive(Clone)]
pub struct StatusOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Clone)]
pub struct RequestRowView {
    pub id: String,
    pub heading: String,
    pub details: Vec<(String, String)>,
    pub message: Option<String>,
    pub received: Option<String>,
    pub status: &'static str,
    pub statuses: Vec<StatusOptionView>,
    pub status_action: Option<String>,
    pub delete_action: String,
}

#[derive(Clone)]
pub struct RequestsPanelView {
    pub heading: String,
    pub kind: &'static str,
    pub refresh_action: String,
    pub rows: Vec<RequestRowView>,
    pub empty_message: String,
    pub banner: Option<BannerView>,
}

impl RequestsPanelView {
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }
}

#[derive(Template)]
#[template(path = "admin/requests.html")]
pub struct AdminRequestsTemplate {
    pub chrome: AdminChrome,
    pub panel: RequestsPanelView,
}

#[derive(Template)]
#[template(path = "admin/requests_panel.html")]
pub struct AdminRequestsPanelTemplate {
    pub panel: RequestsPanelView,
}
