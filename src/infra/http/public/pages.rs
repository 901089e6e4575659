use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    response::Response,
};
use civitas_api_types::Event;
use tracing::warn;

use crate::{
    domain::records::sort_for_display,
    presentation::views::{
        EventCardView, EventsTemplate, EventsView, HomeTemplate, HomeView, LayoutContext,
        MarketingSection, MarketingTemplate, MarketingView, SiteChrome, hub_directory,
        render_not_found_response, render_template_response,
    },
};

use super::PublicState;

struct MarketingCopy {
    path: &'static str,
    heading: &'static str,
    lead: &'static str,
    sections: &'static [(&'static str, &'static str)],
    with_hubs: bool,
}

const MARKETING_PAGES: [MarketingCopy; 5] = [
    MarketingCopy {
        path: "/about",
        heading: "About the Institute",
        lead: "An independent, non-partisan research organisation working on the institutions that shape climate and economic policy.",
        sections: &[
            (
                "Mission",
                "We produce evidence that public bodies, investors and citizens can use to hold decision makers to account.",
            ),
            (
                "Independence",
                "Our research agenda is set by our fellows. Funders have no say over findings or publication.",
            ),
        ],
        with_hubs: false,
    },
    MarketingCopy {
        path: "/insights",
        heading: "Insights",
        lead: "Short analysis, commentary and seminar notes from across our programmes.",
        sections: &[],
        with_hubs: true,
    },
    MarketingCopy {
        path: "/publications",
        heading: "Publications",
        lead: "Reports, working papers and policy briefs, grouped by programme.",
        sections: &[],
        with_hubs: true,
    },
    MarketingCopy {
        path: "/people",
        heading: "People",
        lead: "Fellows, associates and staff who carry out and support our research.",
        sections: &[
            (
                "Fellows",
                "Senior researchers who lead programmes and supervise working papers.",
            ),
            (
                "Associates",
                "Practitioners from government, finance and civil society who contribute to seminars and reviews.",
            ),
        ],
        with_hubs: false,
    },
    MarketingCopy {
        path: "/education",
        heading: "Education",
        lead: "Courses and executive programmes built on our research.",
        sections: &[
            (
                "Executive programmes",
                "Short courses for public officials and board members on climate governance and sustainable finance.",
            ),
            (
                "Public lectures",
                "Open lectures and seminars announced on the events page.",
            ),
        ],
        with_hubs: false,
    },
];

pub(super) async fn home() -> Response {
    let view = LayoutContext::new(
        SiteChrome::for_path("/", ""),
        HomeView {
            headline: "Research for accountable public policy".to_string(),
            lead: "Independent analysis of climate policy, sustainable investment and the institutions that govern them.".to_string(),
            families: hub_directory(),
        },
    );
    render_template_response(HomeTemplate { view }, StatusCode::OK)
}

pub(super) async fn marketing(OriginalUri(uri): OriginalUri) -> Response {
    let path = uri.path();
    let Some(copy) = MARKETING_PAGES.iter().find(|page| page.path == path) else {
        return render_not_found_response(path);
    };

    let view = LayoutContext::new(
        SiteChrome::for_path(copy.path, copy.heading).with_description(copy.lead),
        MarketingView {
            heading: copy.heading.to_string(),
            lead: copy.lead.to_string(),
            sections: copy
                .sections
                .iter()
                .map(|(title, body)| MarketingSection {
                    title: title.to_string(),
                    body: body.to_string(),
                })
                .collect(),
            families: if copy.with_hubs {
                hub_directory()
            } else {
                Vec::new()
            },
        },
    );
    render_template_response(MarketingTemplate { view }, StatusCode::OK)
}

pub(super) async fn events(State(state): State<PublicState>) -> Response {
    let (events, error) = match state.api.events().await {
        Ok(events) => (published_events(events), None),
        Err(err) => {
            warn!(
                target = "civitas::http::public::events",
                error = %err,
                "event listing failed"
            );
            (Vec::new(), Some(err.user_message()))
        }
    };

    let view = LayoutContext::new(
        SiteChrome::for_path("/events", "Events"),
        EventsView {
            events: events.iter().map(EventCardView::from).collect(),
            error,
        },
    );
    render_template_response(EventsTemplate { view }, StatusCode::OK)
}

fn published_events(events: Vec<Event>) -> Vec<Event> {
    let mut events: Vec<Event> = events.into_iter().filter(|event| event.is_published).collect();
    sort_for_display(&mut events);
    events
}
