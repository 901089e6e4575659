mod collection;
mod dashboard;
mod login;
mod requests;
mod toast;

pub use collection::*;
pub use dashboard::*;
pub use login::*;
pub use requests::*;
pub use toast::*;

use crate::domain::topics::TOPIC_HUBS;

#[derive(Clone)]
pub struct AdminNavigationItemView {
    pub label: String,
    pub href: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct AdminNavigationGroupView {
    pub label: String,
    pub items: Vec<AdminNavigationItemView>,
}

#[derive(Clone)]
pub struct AdminChrome {
    pub brand: String,
    pub title: String,
    pub base: String,
    pub email: Option<String>,
    pub navigation: Vec<AdminNavigationGroupView>,
    pub asset_version: String,
}

impl AdminChrome {
    /// Navigation for `active`, a path relative to the admin base (`""` is the dashboard).
    pub fn new(base: &str, active: &str, title: &str, email: Option<&str>) -> Self {
        let item = |label: &str, path: String| AdminNavigationItemView {
            is_active: active == path,
            href: format!("{base}{path}"),
            label: label.to_string(),
        };

        let topics = TOPIC_HUBS
            .iter()
            .map(|hub| item(hub.title, format!("/topics/{}", hub.slug)))
            .collect();
        let collections = vec![
            item("Hot topics", "/hot-topics".to_string()),
            item("Research", "/research".to_string()),
            item("Events", "/events".to_string()),
            item("Membership plans", "/plans".to_string()),
        ];
        let requests = vec![
            item("Callback requests", "/requests/callbacks".to_string()),
            item("Membership requests", "/requests/memberships".to_string()),
        ];

        Self {
            brand: "Civitas admin".to_string(),
            title: title.to_string(),
            base: base.to_string(),
            email: email.map(str::to_string),
            navigation: vec![
                AdminNavigationGroupView {
                    label: "Overview".to_string(),
                    items: vec![item("Dashboard", String::new())],
                },
                AdminNavigationGroupView {
                    label: "Topic pages".to_string(),
                    items: topics,
                },
                AdminNavigationGroupView {
                    label: "Collections".to_string(),
                    items: collections,
                },
                AdminNavigationGroupView {
                    label: "Requests".to_string(),
                    items: requests,
                },
            ],
            asset_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Clone)]
pub struct BannerView {
    pub message: String,
    pub is_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_prefixes_links_with_base() {
        let chrome = AdminChrome::new("/admin", "/events", "Events", Some("a@b.co"));
        let active: Vec<&AdminNavigationItemView> = chrome
            .navigation
            .iter()
            .flat_map(|group| group.items.iter())
            .filter(|item| item.is_active)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].href, "/admin/events");
        assert_eq!(chrome.navigation[1].items.len(), TOPIC_HUBS.len());
    }
}
