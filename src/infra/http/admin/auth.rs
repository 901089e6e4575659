//! Sign-in, sign-out and the guard in front of every other admin route.

use axum::{
    body::Body,
    extract::{Form, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    application::{
        error::ErrorReport,
        session::{AdminSession, IDENTITY_COOKIE, LoginError, SESSION_COOKIE, admit},
    },
    infra::http::is_datastar_request,
    presentation::{
        admin::views::{AdminLoginTemplate, LoginView},
        views::render_template_response,
    },
};

use super::{AdminState, shared::redirect_script};

const SOURCE: &str = "infra::http::admin::auth";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LoginForm {
    email: String,
    password: String,
}

/// Admit requests carrying a session token; send everything else to the login page.
///
/// The check runs before any handler, so a visitor without a token never
/// causes an admin backend call.
pub(super) async fn require_session(
    State(state): State<AdminState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let admitted = admit(
        jar.get(SESSION_COOKIE).map(Cookie::value),
        jar.get(IDENTITY_COOKIE).map(Cookie::value),
    );

    match admitted {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(rejection) => {
            debug!(
                target = "civitas::http::admin::auth",
                path = %request.uri().path(),
                reason = %rejection,
                "redirecting to login"
            );
            let login = state.href("/login");
            if is_datastar_request(request.headers()) {
                redirect_script(&login)
            } else {
                Redirect::to(&login).into_response()
            }
        }
    }
}

pub(super) async fn login_page(State(state): State<AdminState>, jar: CookieJar) -> Response {
    if admit(jar.get(SESSION_COOKIE).map(Cookie::value), None).is_ok() {
        return Redirect::to(&state.base_path).into_response();
    }
    render_login(&state, LoginView::default(), StatusCode::OK)
}

pub(super) async fn login_submit(
    State(state): State<AdminState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.login.login(&form.email, &form.password).await {
        Ok(session) => {
            let jar = store_session(&state, jar, &session);
            (jar, Redirect::to(&state.base_path)).into_response()
        }
        Err(err) => {
            let status = login_status(&err);
            let view = LoginView {
                email: form.email.trim().to_string(),
                error: Some(err.to_string()),
                ..LoginView::default()
            };
            let mut response = render_login(&state, view, status);
            ErrorReport::from_error(SOURCE, status, &err).attach(&mut response);
            response
        }
    }
}

/// Forget the token and everything the server held for the session.
pub(super) async fn logout(State(state): State<AdminState>, jar: CookieJar) -> Response {
    if let Ok(session) = admit(jar.get(SESSION_COOKIE).map(Cookie::value), None) {
        let dropped = state.workspaces.drop_session(&session.token.session_key());
        info!(
            target = "civitas::http::admin::auth",
            editors = dropped,
            "admin signed out"
        );
    }
    let jar = jar
        .remove(session_cookie(&state, SESSION_COOKIE, String::new()))
        .remove(session_cookie(&state, IDENTITY_COOKIE, String::new()));
    (jar, Redirect::to(&state.href("/login"))).into_response()
}

fn login_status(err: &LoginError) -> StatusCode {
    match err {
        LoginError::MissingCredentials => StatusCode::BAD_REQUEST,
        LoginError::Backend(err) if err.is_unauthorized() => StatusCode::UNAUTHORIZED,
        LoginError::Backend(_) | LoginError::EmptyToken => StatusCode::BAD_GATEWAY,
    }
}

fn render_login(state: &AdminState, view: LoginView, status: StatusCode) -> Response {
    let view = LoginView {
        action: state.href("/login"),
        asset_base: state.base_path.clone(),
        ..view
    };
    render_template_response(AdminLoginTemplate { view }, status)
}

fn store_session(state: &AdminState, jar: CookieJar, session: &AdminSession) -> CookieJar {
    let jar = jar.add(session_cookie(
        state,
        SESSION_COOKIE,
        session.token.as_str().to_string(),
    ));
    match session.email.as_deref() {
        Some(email) => jar.add(session_cookie(state, IDENTITY_COOKIE, email.to_string())),
        None => jar,
    }
}

/// Session-scoped: no `Max-Age` or `Expires`, so the browser drops it when the session ends.
fn session_cookie(state: &AdminState, name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path(state.base_path.clone())
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(state.secure_cookies)
        .build()
}
