//! Admin console router.
//!
//! Everything is mounted under the configured base path. Only the login page,
//! logout and stylesheets are reachable without a session; every other route
//! sits behind [`auth::require_session`].

mod articles;
mod auth;
mod collections;
mod dashboard;
mod events;
mod forms;
mod insights;
mod plans;
mod requests;
mod selectors;
mod shared;
mod state;
mod topics;

pub use state::AdminState;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};

use crate::infra::assets;

use super::middleware::{log_responses, set_request_context};
use collections::AdminCollection;

pub fn build_admin_router(state: AdminState, upload_body_limit: usize) -> Router {
    let guarded = Router::new().route("/", get(dashboard::admin_dashboard));
    let guarded = collection_routes::<topics::TopicsPage>(guarded, "/topics/{page}", upload_body_limit)
        .route(
            "/topics/{page}/tab/{section}",
            post(topics::switch_tab).layer(DefaultBodyLimit::max(upload_body_limit)),
        );
    let guarded = collection_routes::<insights::HotTopicsPage>(guarded, "/hot-topics", upload_body_limit);
    let guarded = collection_routes::<insights::ResearchPage>(guarded, "/research", upload_body_limit);
    let guarded = collection_routes::<events::EventsPage>(guarded, "/events", upload_body_limit);
    let guarded = collection_routes::<plans::PlansPage>(guarded, "/plans", upload_body_limit).route(
        "/plans/gallery",
        post(plans::gallery).layer(DefaultBodyLimit::max(upload_body_limit)),
    );
    let guarded = guarded
        .route("/requests/callbacks", get(requests::callbacks_page))
        .route("/requests/callbacks/refresh", post(requests::refresh_callbacks))
        .route(
            "/requests/callbacks/items/{id}/status",
            post(requests::set_callback_status),
        )
        .route(
            "/requests/callbacks/items/{id}/delete",
            post(requests::delete_callback),
        )
        .route("/requests/memberships", get(requests::memberships_page))
        .route(
            "/requests/memberships/refresh",
            post(requests::refresh_memberships),
        )
        .route(
            "/requests/memberships/items/{id}/delete",
            post(requests::delete_membership),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    let open = Router::new()
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", post(auth::logout))
        .route("/static/{*path}", get(assets::serve));

    let base_path = state.base_path.clone();
    Router::new()
        .nest(&base_path, guarded.merge(open))
        .route("/", get(to_base))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

/// Register the shared editor routes for one collection under `prefix`.
fn collection_routes<C: AdminCollection>(
    router: Router<AdminState>,
    prefix: &str,
    upload_body_limit: usize,
) -> Router<AdminState> {
    router
        .route(prefix, get(collections::page::<C>))
        .route(
            &format!("{prefix}/refresh"),
            post(collections::refresh::<C>),
        )
        .route(
            &format!("{prefix}/save"),
            post(collections::save::<C>).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route(
            &format!("{prefix}/image"),
            post(collections::upload_image::<C>).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route(&format!("{prefix}/cancel"), post(collections::cancel::<C>))
        .route(
            &format!("{prefix}/items/{{id}}/edit"),
            post(collections::edit::<C>),
        )
        .route(
            &format!("{prefix}/items/{{id}}/visibility"),
            post(collections::toggle_visibility::<C>),
        )
        .route(
            &format!("{prefix}/items/{{id}}/delete"),
            post(collections::delete::<C>),
        )
}

async fn to_base(State(state): State<AdminState>) -> Response {
    Redirect::to(&state.base_path).into_response()
}
