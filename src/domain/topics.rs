//! Registry of topic hubs.
//!
//! Every hub shares one content model; they differ only in slug, copy and
//! the layout used for the Latest and Archive zones.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HubFamily {
    Climate,
    Investment,
    Institutions,
}

impl HubFamily {
    pub fn label(self) -> &'static str {
        match self {
            HubFamily::Climate => "Climate",
            HubFamily::Investment => "Investment",
            HubFamily::Institutions => "Institutions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LatestLayout {
    Grid,
    Slider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveLayout {
    List,
    Slider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TopicHub {
    pub slug: &'static str,
    pub title: &'static str,
    pub family: HubFamily,
    pub intro: &'static str,
    pub latest: LatestLayout,
    pub archive: ArchiveLayout,
}

const fn hub(
    slug: &'static str,
    title: &'static str,
    family: HubFamily,
    intro: &'static str,
    latest: LatestLayout,
    archive: ArchiveLayout,
) -> TopicHub {
    TopicHub {
        slug,
        title,
        family,
        intro,
        latest,
        archive,
    }
}

pub const TOPIC_HUBS: &[TopicHub] = &[
    hub(
        "seminars",
        "Seminars & Dialogues",
        HubFamily::Institutions,
        "Closed-door roundtables and public dialogues convening policymakers, investors and researchers.",
        LatestLayout::Grid,
        ArchiveLayout::List,
    ),
    hub(
        "partnerships",
        "Institutional Partnerships",
        HubFamily::Institutions,
        "Joint programmes with universities, multilateral lenders and public agencies.",
        LatestLayout::Grid,
        ArchiveLayout::List,
    ),
    hub(
        "governance",
        "Governance & Regulation",
        HubFamily::Institutions,
        "How rules, regulators and accountability shape the transition.",
        LatestLayout::Slider,
        ArchiveLayout::List,
    ),
    hub(
        "energytransition",
        "Energy Transition",
        HubFamily::Climate,
        "Power systems, grids and industrial decarbonisation pathways.",
        LatestLayout::Slider,
        ArchiveLayout::Slider,
    ),
    hub(
        "climatepolicy",
        "Climate Policy",
        HubFamily::Climate,
        "National commitments, carbon pricing and the politics of delivery.",
        LatestLayout::Grid,
        ArchiveLayout::List,
    ),
    hub(
        "adaptation",
        "Adaptation & Resilience",
        HubFamily::Climate,
        "Preparing cities, farms and infrastructure for a warmer world.",
        LatestLayout::Grid,
        ArchiveLayout::Slider,
    ),
    hub(
        "naturecapital",
        "Nature & Biodiversity",
        HubFamily::Climate,
        "Valuing ecosystems and financing their protection.",
        LatestLayout::Slider,
        ArchiveLayout::List,
    ),
    hub(
        "climatefinance",
        "Climate Finance",
        HubFamily::Investment,
        "Mobilising public and private capital for mitigation and adaptation.",
        LatestLayout::Grid,
        ArchiveLayout::List,
    ),
    hub(
        "sustainableinvestment",
        "Sustainable Investment",
        HubFamily::Investment,
        "Disclosure, taxonomies and portfolio alignment.",
        LatestLayout::Slider,
        ArchiveLayout::List,
    ),
    hub(
        "impactinvestment",
        "Impact Investment",
        HubFamily::Investment,
        "Measuring outcomes alongside returns.",
        LatestLayout::Grid,
        ArchiveLayout::Slider,
    ),
    hub(
        "capitalmarkets",
        "Capital Markets",
        HubFamily::Investment,
        "Green bonds, transition debt and market infrastructure.",
        LatestLayout::Grid,
        ArchiveLayout::List,
    ),
    hub(
        "infrastructure",
        "Infrastructure Investment",
        HubFamily::Investment,
        "Project pipelines, blended finance and delivery risk.",
        LatestLayout::Slider,
        ArchiveLayout::Slider,
    ),
];

pub fn find_hub(slug: &str) -> Option<&'static TopicHub> {
    TOPIC_HUBS.iter().find(|hub| hub.slug == slug)
}

pub fn hubs_in(family: HubFamily) -> impl Iterator<Item = &'static TopicHub> {
    TOPIC_HUBS.iter().filter(move |hub| hub.family == family)
}
