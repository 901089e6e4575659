use askama::Template;

use super::{AdminChrome, BannerView};

/// One input of an editor form. `kind` selects the widget:
/// `text`, `textarea`, `select`, `checkbox`, `number` or `url`.
#[derive(Clone)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub kind: &'static str,
    pub value: String,
    pub options: Vec<FieldOptionView>,
    pub checked: bool,
    pub hint: Option<String>,
}

impl FieldView {
    pub fn text(name: &str, label: &str, value: &str) -> Self {
        Self::with_kind("text", name, label, value)
    }

    pub fn textarea(name: &str, label: &str, value: &str) -> Self {
        Self::with_kind("textarea", name, label, value)
    }

    pub fn number(name: &str, label: &str, value: &str) -> Self {
        Self::with_kind("number", name, label, value)
    }

    pub fn url(name: &str, label: &str, value: &str) -> Self {
        Self::with_kind("url", name, label, value)
    }

    pub fn checkbox(name: &str, label: &str, checked: bool) -> Self {
        Self {
            checked,
            ..Self::with_kind("checkbox", name, label, "on")
        }
    }

    pub fn select<'a>(
        name: &str,
        label: &str,
        options: impl IntoIterator<Item = (&'a str, &'a str)>,
        current: Option<&str>,
    ) -> Self {
        let mut options: Vec<FieldOptionView> = options
            .into_iter()
            .map(|(value, label)| FieldOptionView {
                value: value.to_string(),
                label: label.to_string(),
                selected: current == Some(value),
            })
            .collect();
        options.insert(
            0,
            FieldOptionView {
                value: String::new(),
                label: "Choose…".to_string(),
                selected: current.is_none(),
            },
        );
        Self {
            options,
            ..Self::with_kind("select", name, label, current.unwrap_or_default())
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    fn with_kind(kind: &'static str, name: &str, label: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            value: value.to_string(),
            options: Vec::new(),
            checked: false,
            hint: None,
        }
    }
}

#[derive(Clone)]
pub struct FieldOptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone)]
pub struct TabView {
    pub label: String,
    pub count: usize,
    pub is_active: bool,
    pub action: String,
}

#[derive(Clone)]
pub struct RowView {
    pub id: String,
    pub title: String,
    pub meta: String,
    pub thumbnail: Option<String>,
    pub visible: bool,
    pub visible_label: &'static str,
    pub toggle_label: &'static str,
    pub pending: bool,
    pub is_editing: bool,
    pub edit_action: String,
    pub toggle_action: String,
    pub delete_action: String,
}

#[derive(Clone)]
pub struct ImageThumbView {
    pub url: String,
    pub public_id: String,
    pub is_cover: bool,
}

#[derive(Clone)]
pub struct CollectionPanelView {
    pub heading: String,
    pub entity: String,
    pub base: String,
    pub tabs: Vec<TabView>,
    pub rows: Vec<RowView>,
    pub empty_message: String,
    pub fields: Vec<FieldView>,
    pub form_title: String,
    pub submit_label: &'static str,
    pub is_editing: bool,
    pub is_saving: bool,
    pub is_loaded: bool,
    pub banner: Option<BannerView>,
    pub image_preview: Option<String>,
    pub gallery: Vec<ImageThumbView>,
    pub has_gallery: bool,
    pub accept: String,
    pub max_upload_mb: u64,
}

impl CollectionPanelView {
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn has_tabs(&self) -> bool {
        !self.tabs.is_empty()
    }
}

#[derive(Template)]
#[template(path = "admin/collection.html")]
pub struct AdminCollectionTemplate {
    pub chrome: AdminChrome,
    pub panel: CollectionPanelView,
}

#[derive(Template)]
#[template(path = "admin/collection_panel.html")]
pub struct AdminCollectionPanelTemplate {
    pub panel: CollectionPanelView,
}

#[derive(Template)]
#[template(path = "admin/upload_progress.html")]
pub struct AdminUploadProgressTemplate {
    pub percent: u8,
    pub label: String,
}
