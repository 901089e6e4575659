use askama::Template;

use super::AdminChrome;

#[derive(Clone)]
pub struct AdminDashboardLinkView {
    pub label: String,
    pub href: String,
    pub caption: String,
}

#[derive(Clone)]
pub struct AdminDashboardPanelView {
    pub title: String,
    pub caption: String,
    pub links: Vec<AdminDashboardLinkView>,
}

#[derive(Clone)]
pub struct AdminDashboardView {
    pub title: String,
    pub panels: Vec<AdminDashboardPanelView>,
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub chrome: AdminChrome,
    pub view: AdminDashboardView,
}
