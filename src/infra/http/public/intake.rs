//! Callback and membership request forms.
//!
//! Datastar submissions get a live stream: the form is patched to its
//! submitting state first, then to the settled state once the backend answers.
//! Plain form posts render the whole page with the settled form.

use askama::Template;
use axum::{
    extract::{Form, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use datastar::prelude::ElementPatchMode;
use serde::Deserialize;
use tracing::warn;

use crate::{
    application::{
        intake::{Intake, IntakeState},
        stream::{LiveStream, StreamBuilder},
    },
    domain::{
        contact::{CallbackForm, MembershipForm},
        countries::suggest_countries,
        plans::offered_plans,
    },
    presentation::views::{
        ContactFormPartial, ContactFormView, ContactPageView, ContactTemplate,
        CountryFieldPartial, CountrySuggestionsPartial, IntakeStatusView, LayoutContext,
        MembershipFormPartial, MembershipFormView, MembershipPageView, MembershipTemplate,
        PlanCardView, PublicToastPartial, SiteChrome, render_fragment, render_template_response,
    },
};

use super::{
    CONTACT_FORM, COUNTRY_FIELD, COUNTRY_SUGGESTIONS, MEMBERSHIP_FORM, PublicState, SITE_TOASTS,
    toast_stream,
};
use crate::infra::http::is_datastar_request;

const SOURCE: &str = "infra::http::public::intake";
const SUGGESTION_LIMIT: usize = 8;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct CountryQuery {
    q: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct CountryChoice {
    name: String,
}

pub(super) async fn contact_page() -> Response {
    contact_page_response(&Intake::new(CallbackForm::default()))
}

pub(super) async fn submit_callback(
    State(state): State<PublicState>,
    headers: HeaderMap,
    Form(fields): Form<CallbackForm>,
) -> Response {
    let intake = Intake::new(fields);
    if !is_datastar_request(&headers) {
        let settled = state.intake.submit_callback(intake).await;
        return contact_page_response(&settled);
    }

    let (live, response) = LiveStream::open();
    if intake.fields.validate().is_ok() {
        patch_contact_form(
            &live,
            &Intake {
                fields: intake.fields.clone(),
                state: IntakeState::Submitting,
            },
        );
    }

    let service = state.intake.clone();
    tokio::spawn(async move {
        let settled = service.submit_callback(intake).await;
        patch_contact_form(&live, &settled);
        if settled.state == IntakeState::Succeeded {
            patch_toast(&live, "Callback request sent.");
        }
    });
    response
}

pub(super) async fn country_suggestions(Query(query): Query<CountryQuery>) -> Response {
    let template = CountrySuggestionsPartial {
        suggestions: suggest_countries(&query.q, SUGGESTION_LIMIT)
            .into_iter()
            .map(str::to_string)
            .collect(),
    };
    match render_fragment(template, SOURCE) {
        Ok(html) => {
            let mut stream = StreamBuilder::new();
            stream.push_patch(html, COUNTRY_SUGGESTIONS, ElementPatchMode::Replace);
            stream.into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// Only a listed country may be chosen; the field then shows its canonical name.
pub(super) async fn choose_country(Query(choice): Query<CountryChoice>) -> Response {
    let mut fields = CallbackForm::default();
    if let Err(err) = fields.choose_country(&choice.name) {
        return toast_stream(err.banner());
    }
    let template = CountryFieldPartial {
        query: fields.country_query,
        country: fields.country,
    };
    match render_fragment(template, SOURCE) {
        Ok(html) => {
            let mut stream = StreamBuilder::new();
            stream.push_patch(html, COUNTRY_FIELD, ElementPatchMode::Replace);
            stream.into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(super) async fn membership_page(State(state): State<PublicState>) -> Response {
    let (plans, error) = load_plans(&state).await;
    membership_page_response(&Intake::new(MembershipForm::default()), plans, error)
}

pub(super) async fn submit_membership(
    State(state): State<PublicState>,
    headers: HeaderMap,
    Form(fields): Form<MembershipForm>,
) -> Response {
    let intake = Intake::new(fields);
    let (plans, error) = load_plans(&state).await;
    if !is_datastar_request(&headers) {
        let settled = state.intake.submit_membership(intake).await;
        return membership_page_response(&settled, plans, error);
    }

    let plan_names: Vec<String> = plans.iter().map(|plan| plan.plan.clone()).collect();
    let (live, response) = LiveStream::open();
    if intake.fields.validate().is_ok() {
        patch_membership_form(
            &live,
            &Intake {
                fields: intake.fields.clone(),
                state: IntakeState::Submitting,
            },
            &plan_names,
        );
    }

    let service = state.intake.clone();
    tokio::spawn(async move {
        let settled = service.submit_membership(intake).await;
        patch_membership_form(&live, &settled, &plan_names);
        if settled.state == IntakeState::Succeeded {
            patch_toast(&live, "Membership request sent.");
        }
    });
    response
}

async fn load_plans(state: &PublicState) -> (Vec<PlanCardView>, Option<String>) {
    match state.api.plans().await {
        Ok(plans) => (
            offered_plans(plans).iter().map(PlanCardView::from).collect(),
            None,
        ),
        Err(err) => {
            warn!(
                target = "civitas::http::public::intake",
                error = %err,
                "membership plan listing failed"
            );
            (Vec::new(), Some(err.user_message()))
        }
    }
}

fn contact_form(intake: &Intake<CallbackForm>) -> ContactFormView {
    ContactFormView::new(intake.fields.clone(), IntakeStatusView::from(&intake.state))
}

fn membership_form(intake: &Intake<MembershipForm>, plan_names: &[String]) -> MembershipFormView {
    MembershipFormView::new(
        intake.fields.clone(),
        plan_names,
        IntakeStatusView::from(&intake.state),
    )
}

fn contact_page_response(intake: &Intake<CallbackForm>) -> Response {
    let view = LayoutContext::new(
        SiteChrome::for_path("/contact", "Contact"),
        ContactPageView {
            heading: "Request a callback".to_string(),
            lead: "Tell us what you would like to discuss and a member of our team will call or write back.".to_string(),
        },
    );
    render_template_response(
        ContactTemplate {
            view,
            form: contact_form(intake),
        },
        StatusCode::OK,
    )
}

fn membership_page_response(
    intake: &Intake<MembershipForm>,
    plans: Vec<PlanCardView>,
    error: Option<String>,
) -> Response {
    let plan_names: Vec<String> = plans.iter().map(|plan| plan.plan.clone()).collect();
    let form = membership_form(intake, &plan_names);
    let view = LayoutContext::new(
        SiteChrome::for_path("/membership", "Membership"),
        MembershipPageView { plans, error },
    );
    render_template_response(MembershipTemplate { view, form }, StatusCode::OK)
}

fn patch_contact_form(live: &LiveStream, intake: &Intake<CallbackForm>) {
    let partial = ContactFormPartial {
        form: contact_form(intake),
    };
    patch_fragment(live, partial, CONTACT_FORM);
}

fn patch_membership_form(live: &LiveStream, intake: &Intake<MembershipForm>, plan_names: &[String]) {
    let partial = MembershipFormPartial {
        form: membership_form(intake, plan_names),
    };
    patch_fragment(live, partial, MEMBERSHIP_FORM);
}

fn patch_toast(live: &LiveStream, message: &str) {
    let partial = PublicToastPartial {
        message: message.to_string(),
    };
    patch_fragment(live, partial, SITE_TOASTS);
}

fn patch_fragment<T: Template>(live: &LiveStream, template: T, selector: &str) {
    match template.render() {
        Ok(html) => live.patch(html, selector, ElementPatchMode::Replace),
        Err(err) => warn!(
            target = "civitas::http::public::intake",
            selector,
            error = %err,
            "form fragment failed to render"
        ),
    }
}
