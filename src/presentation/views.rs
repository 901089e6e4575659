use crate::application::error::{ErrorReport, HttpError};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use civitas_api_types::{ContentItem, Event, MembershipPlan};
use thiserror::Error;

use crate::application::intake::IntakeState;
use crate::domain::contact::{CALLBACK_SUBJECTS, CallbackForm, MembershipForm};
use crate::domain::content::body_paragraphs;
use crate::domain::plans::{cover_image, format_price};
use crate::domain::topics::{ArchiveLayout, HubFamily, LatestLayout, TOPIC_HUBS, TopicHub};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

/// Render a fragment for a datastar patch.
pub fn render_fragment<T: Template>(template: T, source: &'static str) -> Result<String, HttpError> {
    template
        .render()
        .map_err(|err| TemplateRenderError::new(source, "Template rendering failed", err).into())
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(path: &str) -> Response {
    let view = LayoutContext::new(SiteChrome::for_path(path, "Page not found"), ErrorPageView::not_found());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

pub const SITE_TITLE: &str = "Civitas Institute";

const SITE_DESCRIPTION: &str =
    "Independent research on climate policy, sustainable investment and public institutions.";

const NAVIGATION: [(&str, &str); 8] = [
    ("About", "/about"),
    ("Insights", "/insights"),
    ("Publications", "/publications"),
    ("Events", "/events"),
    ("People", "/people"),
    ("Education", "/education"),
    ("Membership", "/membership"),
    ("Contact", "/contact"),
];

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
}

#[derive(Clone)]
pub struct SiteChrome {
    pub brand: String,
    pub navigation: Vec<NavigationLinkView>,
    pub footer: String,
    pub meta: PageMetaView,
}

impl SiteChrome {
    pub fn for_path(path: &str, title: &str) -> Self {
        let navigation = NAVIGATION
            .iter()
            .map(|(label, href)| NavigationLinkView {
                label: label.to_string(),
                href: href.to_string(),
                is_active: path == *href || path.starts_with(&format!("{href}/")),
            })
            .collect();
        let title = if title.is_empty() {
            SITE_TITLE.to_string()
        } else {
            format!("{title} | {SITE_TITLE}")
        };
        Self {
            brand: SITE_TITLE.to_string(),
            navigation,
            footer: format!("{SITE_TITLE}. Research for accountable public policy."),
            meta: PageMetaView {
                title,
                description: SITE_DESCRIPTION.to_string(),
            },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = description.into();
        self
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: String,
    pub navigation: Vec<NavigationLinkView>,
    pub footer: String,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: SiteChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl OptionView {
    pub fn list<'a>(values: impl IntoIterator<Item = &'a str>, current: &str) -> Vec<Self> {
        values
            .into_iter()
            .map(|value| OptionView {
                value: value.to_string(),
                label: value.to_string(),
                selected: value == current,
            })
            .collect()
    }
}

// ----- Hub directory -----

#[derive(Clone)]
pub struct HubLinkView {
    pub title: String,
    pub href: String,
    pub intro: String,
}

#[derive(Clone)]
pub struct HubFamilyView {
    pub label: String,
    pub hubs: Vec<HubLinkView>,
}

pub fn hub_directory() -> Vec<HubFamilyView> {
    [
        HubFamily::Institutions,
        HubFamily::Climate,
        HubFamily::Investment,
    ]
    .into_iter()
    .map(|family| HubFamilyView {
        label: family.label().to_string(),
        hubs: TOPIC_HUBS
            .iter()
            .filter(|hub| hub.family == family)
            .map(|hub| HubLinkView {
                title: hub.title.to_string(),
                href: format!("/topics/{}", hub.slug),
                intro: hub.intro.to_string(),
            })
            .collect(),
    })
    .collect()
}

pub struct HomeView {
    pub headline: String,
    pub lead: String,
    pub families: Vec<HubFamilyView>,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub view: LayoutContext<HomeView>,
}

#[derive(Clone)]
pub struct MarketingSection {
    pub title: String,
    pub body: String,
}

pub struct MarketingView {
    pub heading: String,
    pub lead: String,
    pub sections: Vec<MarketingSection>,
    pub families: Vec<HubFamilyView>,
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct MarketingTemplate {
    pub view: LayoutContext<MarketingView>,
}

// ----- Topic hubs -----

#[derive(Clone)]
pub struct ItemCardView {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub author: String,
    pub date: String,
    pub kind: String,
    pub image_url: Option<String>,
    pub excerpt: String,
    pub read_url: String,
}

impl ItemCardView {
    pub fn from_item(slug: &str, item: &ContentItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            subtitle: item.subtitle.clone(),
            author: item.author.clone(),
            date: item.date.clone(),
            kind: item.kind.to_string(),
            image_url: non_empty(&item.image_url),
            excerpt: item.excerpt.clone(),
            read_url: format!("/topics/{slug}/read/{}", item.id),
        }
    }
}

#[derive(Clone)]
pub struct ReadingView {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub author: String,
    pub date: String,
    pub kind: String,
    pub image_url: Option<String>,
    /// Paragraphs, each a list of lines.
    pub paragraphs: Vec<Vec<String>>,
    pub close_url: String,
}

impl ReadingView {
    pub fn from_item(slug: &str, item: &ContentItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            subtitle: item.subtitle.clone(),
            author: item.author.clone(),
            date: item.date.clone(),
            kind: item.kind.to_string(),
            image_url: non_empty(&item.image_url),
            paragraphs: body_paragraphs(&item.body)
                .into_iter()
                .map(|lines| lines.into_iter().map(str::to_string).collect())
                .collect(),
            close_url: format!("/topics/{slug}/close"),
        }
    }
}

pub struct TopicPageView {
    pub slug: String,
    pub title: String,
    pub family: String,
    pub intro: String,
    pub featured: Vec<ItemCardView>,
    pub latest: Vec<ItemCardView>,
    pub archive: Vec<ItemCardView>,
    pub latest_layout: &'static str,
    pub archive_layout: &'static str,
    pub error: Option<String>,
}

impl TopicPageView {
    pub fn new(hub: &TopicHub, featured: &[ContentItem], latest: &[ContentItem], archive: &[ContentItem], error: Option<String>) -> Self {
        let cards = |items: &[ContentItem]| {
            items
                .iter()
                .map(|item| ItemCardView::from_item(hub.slug, item))
                .collect::<Vec<_>>()
        };
        Self {
            slug: hub.slug.to_string(),
            title: hub.title.to_string(),
            family: hub.family.label().to_string(),
            intro: hub.intro.to_string(),
            featured: cards(featured),
            latest: cards(latest),
            archive: cards(archive),
            latest_layout: match hub.latest {
                LatestLayout::Grid => "grid",
                LatestLayout::Slider => "slider",
            },
            archive_layout: match hub.archive {
                ArchiveLayout::List => "list",
                ArchiveLayout::Slider => "slider",
            },
            error,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.featured.is_empty() && self.latest.is_empty() && self.archive.is_empty()
    }
}

#[derive(Template)]
#[template(path = "topic.html")]
pub struct TopicTemplate {
    pub view: LayoutContext<TopicPageView>,
}

#[derive(Template)]
#[template(path = "partials/reading.html")]
pub struct ReadingTemplate {
    pub reading: Option<ReadingView>,
}

// ----- Events -----

#[derive(Clone)]
pub struct EventCardView {
    pub title: String,
    pub date: String,
    pub location: String,
    pub summary: String,
    pub image_url: Option<String>,
    pub registration_url: Option<String>,
}

impl From<&Event> for EventCardView {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            date: event.date.clone(),
            location: event.location.clone(),
            summary: event.summary.clone(),
            image_url: non_empty(&event.image_url),
            registration_url: event.registration_url.as_deref().and_then(non_empty),
        }
    }
}

pub struct EventsView {
    pub events: Vec<EventCardView>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "events.html")]
pub struct EventsTemplate {
    pub view: LayoutContext<EventsView>,
}

// ----- Request intake -----

/// Where a public form submission stands, flattened for templates.
#[derive(Clone, Default)]
pub struct IntakeStatusView {
    pub error: Option<String>,
    pub submitting: bool,
    pub succeeded: bool,
}

impl From<&IntakeState> for IntakeStatusView {
    fn from(state: &IntakeState) -> Self {
        match state {
            IntakeState::Idle { error } => Self {
                error: error.clone(),
                ..Self::default()
            },
            IntakeState::Submitting => Self {
                submitting: true,
                ..Self::default()
            },
            IntakeState::Succeeded => Self {
                succeeded: true,
                ..Self::default()
            },
        }
    }
}

#[derive(Clone)]
pub struct ContactFormView {
    pub fields: CallbackForm,
    pub subjects: Vec<OptionView>,
    pub status: IntakeStatusView,
}

impl ContactFormView {
    pub fn new(fields: CallbackForm, status: IntakeStatusView) -> Self {
        let subjects = OptionView::list(CALLBACK_SUBJECTS, &fields.subject);
        Self {
            fields,
            subjects,
            status,
        }
    }
}

pub struct ContactPageView {
    pub heading: String,
    pub lead: String,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub view: LayoutContext<ContactPageView>,
    pub form: ContactFormView,
}

#[derive(Template)]
#[template(path = "partials/contact_form.html")]
pub struct ContactFormPartial {
    pub form: ContactFormView,
}

#[derive(Template)]
#[template(path = "partials/country_suggestions.html")]
pub struct CountrySuggestionsPartial {
    pub suggestions: Vec<String>,
}

#[derive(Template)]
#[template(path = "partials/country_field.html")]
pub struct CountryFieldPartial {
    pub query: String,
    pub country: String,
}

#[derive(Clone)]
pub struct PlanCardView {
    pub plan: String,
    pub title: String,
    pub subject: String,
    pub short: String,
    pub intro: String,
    pub price: String,
    pub features: Vec<String>,
    pub cover_url: Option<String>,
}

impl From<&MembershipPlan> for PlanCardView {
    fn from(plan: &MembershipPlan) -> Self {
        Self {
            plan: plan.plan.clone(),
            title: if plan.title.trim().is_empty() {
                plan.plan.clone()
            } else {
                plan.title.clone()
            },
            subject: plan.subject.clone(),
            short: plan.short.clone(),
            intro: plan.intro.clone(),
            price: format_price(plan),
            features: plan.features.clone(),
            cover_url: cover_image(plan).map(|image| image.secure_url.clone()),
        }
    }
}

#[derive(Clone)]
pub struct MembershipFormView {
    pub fields: MembershipForm,
    pub plans: Vec<OptionView>,
    pub status: IntakeStatusView,
}

impl MembershipFormView {
    pub fn new(fields: MembershipForm, plan_names: &[String], status: IntakeStatusView) -> Self {
        let plans = OptionView::list(plan_names.iter().map(String::as_str), &fields.plan);
        Self {
            fields,
            plans,
            status,
        }
    }
}

pub struct MembershipPageView {
    pub plans: Vec<PlanCardView>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "membership.html")]
pub struct MembershipTemplate {
    pub view: LayoutContext<MembershipPageView>,
    pub form: MembershipFormView,
}

#[derive(Template)]
#[template(path = "partials/membership_form.html")]
pub struct MembershipFormPartial {
    pub form: MembershipFormView,
}

#[derive(Template)]
#[template(path = "partials/toast.html")]
pub struct PublicToastPartial {
    pub message: String,
}

// ----- Errors -----

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
