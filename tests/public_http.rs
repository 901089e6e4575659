mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use civitas::infra::http::{PublicState, build_public_router};
use civitas_api_types::{ContentKind, ContentItem, Section};
use tower::ServiceExt;

use common::{FakeBackend, FakePublic, body_text};

fn router(backend: &Arc<FakeBackend>) -> axum::Router {
    build_public_router(PublicState::new(Arc::new(FakePublic(backend.clone()))))
}

fn stored(id: &str, section: Section, title: &str, is_published: bool) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        page: "seminars".to_string(),
        section,
        kind: ContentKind::Briefing,
        title: title.to_string(),
        subtitle: None,
        author: "Ada Moyo".to_string(),
        date: "2025-01-10".to_string(),
        image_url: "https://media.example/a.jpg".to_string(),
        excerpt: "Short excerpt.".to_string(),
        body: "Body text.".to_string(),
        sort_order: 0,
        is_published,
        created_at: None,
    }
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("router responds");
    let status = response.status();
    (status, body_text(response).await)
}

#[tokio::test]
async fn health_check_is_empty_success() {
    let backend = Arc::new(FakeBackend::default());
    let (status, body) = get(router(&backend), "/_health").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[tokio::test]
async fn unknown_paths_render_not_found_page() {
    let backend = Arc::new(FakeBackend::default());
    let (status, _) = get(router(&backend), "/no/such/page").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(router(&backend), "/topics/astrology").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn topic_page_hides_unpublished_items() {
    let backend = Arc::new(FakeBackend::default());
    backend.items.lock().expect("store lock").extend([
        stored("a", Section::Latest, "Visible briefing", true),
        stored("b", Section::Latest, "Hidden draft", false),
    ]);

    let (status, html) = get(router(&backend), "/topics/seminars").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Visible briefing"));
    assert!(!html.contains("Hidden draft"));
}

#[tokio::test]
async fn static_assets_are_served() {
    let backend = Arc::new(FakeBackend::default());
    let (status, body) = get(router(&backend), "/static/site.css").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.is_empty());
}

#[tokio::test]
async fn callback_form_submits_valid_request() {
    let backend = Arc::new(FakeBackend::default());
    let response = router(&backend)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/contact")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "subject=Partnerships&reason=Speaking+request&country=Kenya&email=ada%40example.org",
                ))
                .expect("request"),
        )
        .await
        .expect("router responds");
    let _ = body_text(response).await;

    let submitted = backend.callbacks_submitted.lock().expect("store lock");
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].country, "Kenya");
    assert_eq!(submitted[0].email.as_deref(), Some("ada@example.org"));
}

#[tokio::test]
async fn callback_without_contact_channel_is_not_sent() {
    let backend = Arc::new(FakeBackend::default());
    let response = router(&backend)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/contact")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "subject=Partnerships&reason=Speaking+request&country=Kenya&email=&phone=",
                ))
                .expect("request"),
        )
        .await
        .expect("router responds");
    let body = body_text(response).await;

    assert!(body.contains("Please provide an email address or a phone number."));
    assert!(backend.callbacks_submitted.lock().expect("store lock").is_empty());
}
