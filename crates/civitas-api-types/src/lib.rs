//! Wire types for the Civitas content backend.
//!
//! Field names follow the backend's camelCase JSON. Identifiers are opaque
//! strings assigned by the store; some collections still emit Mongo-style
//! `_id`, so every `id` accepts that alias.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Display zone of a topical content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Featured,
    Latest,
    Archive,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Featured, Section::Latest, Section::Archive];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::Latest => "latest",
            Self::Archive => "archive",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Featured => "Featured",
            Self::Latest => "Latest",
            Self::Archive => "Archive",
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "featured" => Ok(Self::Featured),
            "latest" => Ok(Self::Latest),
            "archive" => Ok(Self::Archive),
            other => Err(UnknownVariant::new("section", other)),
        }
    }
}

/// Display-only classification of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ContentKind {
    #[default]
    #[serde(rename = "Online analysis")]
    OnlineAnalysis,
    #[serde(rename = "Research paper")]
    ResearchPaper,
    #[serde(rename = "Briefing")]
    Briefing,
    #[serde(rename = "Report")]
    Report,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::OnlineAnalysis,
        ContentKind::ResearchPaper,
        ContentKind::Briefing,
        ContentKind::Report,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnlineAnalysis => "Online analysis",
            Self::ResearchPaper => "Research paper",
            Self::Briefing => "Briefing",
            Self::Report => "Report",
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| UnknownVariant::new("type", s))
    }
}

/// Billing cadence of a membership plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Billing {
    #[default]
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "one-time")]
    OneTime,
}

impl Billing {
    pub const ALL: [Billing; 3] = [Billing::Month, Billing::Year, Billing::OneTime];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Year => "year",
            Self::OneTime => "one-time",
        }
    }

    /// Suffix rendered after a price, e.g. "/ month".
    pub fn price_suffix(self) -> &'static str {
        match self {
            Self::Month => "/ month",
            Self::Year => "/ year",
            Self::OneTime => "one-time",
        }
    }
}

impl FromStr for Billing {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|billing| billing.as_str() == s.trim())
            .ok_or_else(|| UnknownVariant::new("billing", s))
    }
}

/// Admin-managed status of an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    New,
    Contacted,
    Closed,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 3] = [
        RequestStatus::New,
        RequestStatus::Contacted,
        RequestStatus::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| UnknownVariant::new("status", s))
    }
}

/// Returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

impl Display for UnknownVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} `{}`", self.field, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

// ----- Topical content -----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(alias = "_id")]
    pub id: String,
    pub page: String,
    #[serde(default)]
    pub section: Section,
    #[serde(rename = "type", default)]
    pub kind: ContentKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub author: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Full-replace body for create (`POST`) and update (`PUT`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContentPayload {
    pub page: String,
    pub section: Section,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub author: String,
    pub date: String,
    pub image_url: String,
    pub excerpt: String,
    pub body: String,
    pub sort_order: i32,
    pub is_published: bool,
}

impl From<&ContentItem> for ContentPayload {
    fn from(item: &ContentItem) -> Self {
        Self {
            page: item.page.clone(),
            section: item.section,
            kind: item.kind,
            title: item.title.clone(),
            subtitle: item.subtitle.clone(),
            author: item.author.clone(),
            date: item.date.clone(),
            image_url: item.image_url.clone(),
            excerpt: item.excerpt.clone(),
            body: item.body.clone(),
            sort_order: item.sort_order,
            is_published: item.is_published,
        }
    }
}

/// Public aggregation payload: one bucket per section, each possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PublicContent {
    #[serde(default)]
    pub featured: Vec<ContentItem>,
    #[serde(default)]
    pub latest: Vec<ContentItem>,
    #[serde(default)]
    pub archive: Vec<ContentItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedPatch {
    pub is_published: bool,
}

// ----- Hot topics and research -----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ContentKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub author: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InsightPayload {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub author: String,
    pub date: String,
    pub image_url: String,
    pub excerpt: String,
    pub body: String,
    pub sort_order: i32,
    pub is_published: bool,
}

impl From<&Insight> for InsightPayload {
    fn from(item: &Insight) -> Self {
        Self {
            kind: item.kind,
            title: item.title.clone(),
            subtitle: item.subtitle.clone(),
            author: item.author.clone(),
            date: item.date.clone(),
            image_url: item.image_url.clone(),
            excerpt: item.excerpt.clone(),
            body: item.body.clone(),
            sort_order: item.sort_order,
            is_published: item.is_published,
        }
    }
}

// ----- Events -----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub title: String,
    pub date: String,
    pub location: String,
    pub summary: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_url: Option<String>,
    pub sort_order: i32,
    pub is_published: bool,
}

impl From<&Event> for EventPayload {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            date: event.date.clone(),
            location: event.location.clone(),
            summary: event.summary.clone(),
            image_url: event.image_url.clone(),
            registration_url: event.registration_url.clone(),
            sort_order: event.sort_order,
            is_published: event.is_published,
        }
    }
}

// ----- Membership plans -----

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanImage {
    pub secure_url: String,
    pub public_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlan {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub subject: String,
    pub plan: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub short: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub billing: Billing,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<PlanImage>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanPayload {
    pub subject: String,
    pub plan: String,
    pub title: String,
    pub short: String,
    pub intro: String,
    pub price: f64,
    pub billing: Billing,
    pub features: Vec<String>,
    pub images: Vec<PlanImage>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl From<&MembershipPlan> for PlanPayload {
    fn from(plan: &MembershipPlan) -> Self {
        Self {
            subject: plan.subject.clone(),
            plan: plan.plan.clone(),
            title: plan.title.clone(),
            short: plan.short.clone(),
            intro: plan.intro.clone(),
            price: plan.price,
            billing: plan.billing,
            features: plan.features.clone(),
            images: plan.images.clone(),
            is_active: plan.is_active,
            sort_order: plan.sort_order,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePatch {
    pub is_active: bool,
}

// ----- Inbound requests -----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackRequest {
    #[serde(alias = "_id")]
    pub id: String,
    pub subject: String,
    pub reason: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CallbackSubmission {
    pub subject: String,
    pub reason: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPatch {
    pub status: RequestStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    #[serde(alias = "_id")]
    pub id: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub plan: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MembershipSubmission {
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub plan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ----- Auth -----

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: AdminIdentity,
}

// ----- Uploads -----

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SignRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

/// Time-boxed signed upload ticket issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    #[serde(default)]
    pub folder: String,
    pub signature: String,
    pub timestamp: i64,
    pub api_key: String,
    pub cloud_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_preset: Option<String>,
}

/// Result of a completed media-host upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    #[serde(alias = "secureUrl")]
    pub secure_url: String,
    #[serde(alias = "publicId")]
    pub public_id: String,
}
