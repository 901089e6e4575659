mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use civitas::infra::http::{PublicState, build_admin_router, build_public_router};
use tower::ServiceExt;

use common::{FakeBackend, FakePublic, MultipartBody, admin_state, body_text, session_cookie};

const UPLOAD_LIMIT: usize = 32 * 1024 * 1024;

#[tokio::test]
async fn guarded_page_without_session_redirects_to_login_without_backend_calls() {
    let backend = Arc::new(FakeBackend::default());
    let router = build_admin_router(admin_state(&backend), UPLOAD_LIMIT);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/admin/topics/seminars")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/admin/login"
    );
    assert_eq!(backend.admin_calls(), 0);
}

#[tokio::test]
async fn datastar_request_without_session_gets_redirect_script() {
    let backend = Arc::new(FakeBackend::default());
    let router = build_admin_router(admin_state(&backend), UPLOAD_LIMIT);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/events/refresh")
                .header("datastar-request", "true")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("/admin/login"));
    assert_eq!(backend.admin_calls(), 0);
}

#[tokio::test]
async fn login_success_sets_session_cookies_and_redirects() {
    let backend = Arc::new(FakeBackend::default());
    let router = build_admin_router(admin_state(&backend), UPLOAD_LIMIT);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=editor%40example.org&password=correct+horse"))
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/admin"
    );
    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok().map(str::to_string))
        .collect();
    let session = cookies
        .iter()
        .find(|cookie| cookie.starts_with("civitas_admin="))
        .expect("session cookie set");
    assert!(session.contains("tok-123"));
    assert!(session.contains("HttpOnly"));
    assert!(!session.contains("Max-Age"));
}

#[tokio::test]
async fn login_failure_shows_backend_message() {
    let backend = Arc::new(FakeBackend::default());
    let router = build_admin_router(admin_state(&backend), UPLOAD_LIMIT);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=editor%40example.org&password=nope"))
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = body_text(response).await;
    assert!(body.contains("Invalid credentials"));
}

#[tokio::test]
async fn oversized_image_is_rejected_before_signing() {
    let backend = Arc::new(FakeBackend::default());
    let router = build_admin_router(admin_state(&backend), UPLOAD_LIMIT);

    let image = vec![0_u8; 15 * 1024 * 1024];
    let (content_type, body) = MultipartBody::new()
        .file("image", "poster.jpg", "image/jpeg", &image)
        .finish();
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/events/image")
                .header(header::COOKIE, session_cookie())
                .header(header::CONTENT_TYPE, content_type)
                .header("datastar-request", "true")
                .body(body)
                .expect("request"),
        )
        .await
        .expect("router responds");

    let body = body_text(response).await;
    assert!(body.contains("Image must be 10 MB or smaller."));
    assert_eq!(backend.sign_calls(), 0);
}

#[tokio::test]
async fn unsupported_image_type_is_rejected_before_signing() {
    let backend = Arc::new(FakeBackend::default());
    let router = build_admin_router(admin_state(&backend), UPLOAD_LIMIT);

    let (content_type, body) = MultipartBody::new()
        .file("image", "notes.pdf", "application/pdf", b"%PDF-1.7")
        .finish();
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/events/image")
                .header(header::COOKIE, session_cookie())
                .header(header::CONTENT_TYPE, content_type)
                .body(body)
                .expect("request"),
        )
        .await
        .expect("router responds");

    let body = body_text(response).await;
    assert!(body.contains("Only JPEG, PNG or WebP images can be uploaded."));
    assert_eq!(backend.sign_calls(), 0);
}

#[tokio::test]
async fn unknown_topic_page_is_not_found() {
    let backend = Arc::new(FakeBackend::default());
    let router = build_admin_router(admin_state(&backend), UPLOAD_LIMIT);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/admin/topics/astrology")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn featured_post_created_in_admin_appears_on_public_topic_page() {
    let backend = Arc::new(FakeBackend::default());
    let admin = build_admin_router(admin_state(&backend), UPLOAD_LIMIT);
    let public = build_public_router(PublicState::new(Arc::new(FakePublic(backend.clone()))));

    let (content_type, body) = MultipartBody::new()
        .text("section", "featured")
        .text("kind", "Report")
        .text("title", "Grain corridors after the thaw")
        .text("author", "Ada Moyo")
        .text("date", "2025-03-01")
        .text("image_url", "https://media.example/grain.jpg")
        .text("excerpt", "What reopened routes mean for prices.")
        .text("body", "First paragraph.\n\nSecond paragraph.")
        .text("sort_order", "0")
        .text("is_published", "on")
        .finish();
    let saved = admin
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/topics/seminars/save")
                .header(header::COOKIE, session_cookie())
                .header(header::CONTENT_TYPE, content_type)
                .header("datastar-request", "true")
                .body(body)
                .expect("request"),
        )
        .await
        .expect("router responds");
    let saved = body_text(saved).await;
    assert!(saved.contains("Saved."));
    assert_eq!(backend.items.lock().expect("store lock").len(), 1);

    let page = public
        .oneshot(
            Request::builder()
                .uri("/topics/seminars")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(page.status(), StatusCode::OK);
    let html = body_text(page).await;
    let (before_latest, after_latest) = html
        .split_once("zone-latest")
        .expect("latest zone rendered");
    let featured = before_latest
        .split_once("zone-featured")
        .map(|(_, rest)| rest)
        .expect("featured zone rendered");
    assert!(featured.contains("Grain corridors after the thaw"));
    assert!(!after_latest.contains("Grain corridors after the thaw"));
}

#[tokio::test]
async fn save_with_missing_fields_makes_no_backend_write() {
    let backend = Arc::new(FakeBackend::default());
    let admin = build_admin_router(admin_state(&backend), UPLOAD_LIMIT);

    let (content_type, body) = MultipartBody::new()
        .text("section", "latest")
        .text("title", "Half written")
        .finish();
    let response = admin
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/topics/seminars/save")
                .header(header::COOKIE, session_cookie())
                .header(header::CONTENT_TYPE, content_type)
                .header("datastar-request", "true")
                .body(body)
                .expect("request"),
        )
        .await
        .expect("router responds");

    let body = body_text(response).await;
    assert!(!body.contains("Saved."));
    assert!(backend.items.lock().expect("store lock").is_empty());
}

#[tokio::test]
async fn rejected_tokens_leave_no_editor_behind() {
    let backend = Arc::new(FakeBackend::default());
    let state = admin_state(&backend);
    let workspaces = state.workspaces.clone();
    let router = build_admin_router(state, UPLOAD_LIMIT);

    for i in 0..20 {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/admin/topics/seminars")
                    .header(header::COOKIE, format!("civitas_admin=bogus-{i}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Invalid session"));
    }
    assert!(workspaces.is_empty());
    assert_eq!(backend.admin_calls(), 20);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/admin/topics/seminars")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(workspaces.topics.len(), 1);
    assert_eq!(workspaces.len(), 1);
}

#[tokio::test]
async fn editing_a_missing_item_shows_a_banner_and_keeps_the_form_new() {
    let backend = Arc::new(FakeBackend::default());
    let router = build_admin_router(admin_state(&backend), UPLOAD_LIMIT);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/topics/seminars/items/gone/edit")
                .header(header::COOKIE, session_cookie())
                .header("datastar-request", "true")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("The requested post no longer exists."));
    assert!(body.contains("New item"));
}
