use std::sync::Arc;

use async_trait::async_trait;
use civitas_api_types::{
    CallbackRequest, CallbackSubmission, ContentItem, Event, Insight, LoginRequest, LoginResponse,
    MembershipPlan, MembershipRequest, MembershipSubmission, PublicContent, RequestStatus,
    SignRequest, StatusPatch, UploadTicket,
};
use reqwest::Method;

use crate::application::backend::{
    AdminCollections, AuthApi, BackendError, CollectionApi, PublicApi, RequestsApi, UploadSigner,
};
use crate::application::session::AdminToken;

use super::{BackendClient, RestCollection};

const CALLBACKS_ADMIN: [&str; 3] = ["api", "callback-requests", "admin"];
const MEMBERSHIPS_ADMIN: [&str; 4] = ["api", "memberships", "requests", "admin"];

impl AdminCollections for BackendClient {
    fn topic(&self, page: &str) -> Arc<dyn CollectionApi<ContentItem>> {
        Arc::new(RestCollection::new(
            self.clone(),
            &["api", "institutions", page, "admin"],
        ))
    }

    fn hot_topics(&self) -> Arc<dyn CollectionApi<Insight>> {
        Arc::new(RestCollection::new(self.clone(), &["api", "admin", "hot-topics"]))
    }

    fn research(&self) -> Arc<dyn CollectionApi<Insight>> {
        Arc::new(RestCollection::new(self.clone(), &["api", "admin", "research"]))
    }

    fn events(&self) -> Arc<dyn CollectionApi<Event>> {
        Arc::new(RestCollection::new(self.clone(), &["api", "events"]))
    }

    fn plans(&self) -> Arc<dyn CollectionApi<MembershipPlan>> {
        Arc::new(RestCollection::new(
            self.clone(),
            &["api", "memberships", "plans", "admin"],
        ))
    }
}

#[async_trait]
impl PublicApi for BackendClient {
    async fn topic_content(&self, page: &str) -> Result<PublicContent, BackendError> {
        self.fetch(
            Method::GET,
            &["api", "institutions", page, "public"],
            None,
            None::<&()>,
        )
        .await
    }

    async fn events(&self) -> Result<Vec<Event>, BackendError> {
        let events: Vec<Event> = self.fetch_list(&["api", "events"], None).await?;
        Ok(events.into_iter().filter(|event| event.is_published).collect())
    }

    async fn plans(&self) -> Result<Vec<MembershipPlan>, BackendError> {
        self.fetch_list(&["api", "memberships", "plans", "public"], None)
            .await
    }

    async fn submit_callback(&self, request: &CallbackSubmission) -> Result<(), BackendError> {
        self.send(
            Method::POST,
            &["api", "callback-requests", "public"],
            None,
            Some(request),
        )
        .await
    }

    async fn submit_membership(
        &self,
        request: &MembershipSubmission,
    ) -> Result<(), BackendError> {
        self.send(
            Method::POST,
            &["api", "memberships", "requests", "public"],
            None,
            Some(request),
        )
        .await
    }
}

#[async_trait]
impl AuthApi for BackendClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, BackendError> {
        self.fetch(Method::POST, &["api", "auth", "login"], None, Some(request))
            .await
    }
}

#[async_trait]
impl RequestsApi for BackendClient {
    async fn callbacks(&self, token: &AdminToken) -> Result<Vec<CallbackRequest>, BackendError> {
        self.fetch_list(&CALLBACKS_ADMIN, Some(token)).await
    }

    async fn set_callback_status(
        &self,
        token: &AdminToken,
        id: &str,
        status: RequestStatus,
    ) -> Result<CallbackRequest, BackendError> {
        let [api, resource, admin] = CALLBACKS_ADMIN;
        self.fetch(
            Method::PUT,
            &[api, resource, admin, id],
            Some(token),
            Some(&StatusPatch { status }),
        )
        .await
    }

    async fn delete_callback(&self, token: &AdminToken, id: &str) -> Result<(), BackendError> {
        let [api, resource, admin] = CALLBACKS_ADMIN;
        self.send(
            Method::DELETE,
            &[api, resource, admin, id],
            Some(token),
            None::<&()>,
        )
        .await
    }

    async fn memberships(
        &self,
        token: &AdminToken,
    ) -> Result<Vec<MembershipRequest>, BackendError> {
        self.fetch_list(&MEMBERSHIPS_ADMIN, Some(token)).await
    }

    async fn delete_membership(&self, token: &AdminToken, id: &str) -> Result<(), BackendError> {
        let [api, memberships, requests, admin] = MEMBERSHIPS_ADMIN;
        self.send(
            Method::DELETE,
            &[api, memberships, requests, admin, id],
            Some(token),
            None::<&()>,
        )
        .await
    }
}

#[async_trait]
impl UploadSigner for BackendClient {
    async fn sign(
        &self,
        token: &AdminToken,
        folder: Option<&str>,
    ) -> Result<UploadTicket, BackendError> {
        let request = SignRequest {
            folder: folder.map(str::to_string),
        };
        self.fetch(
            Method::POST,
            &["api", "admin", "cloudinary", "sign"],
            Some(token),
            Some(&request),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use civitas_api_types::{ContentPayload, Section};
    use httpmock::MockServer;
    use serde_json::json;

    use super::*;
    use crate::config::BackendSettings;

    fn client(server: &MockServer) -> BackendClient {
        let settings = BackendSettings {
            base_url: format!("{}/", server.base_url()).parse().expect("url"),
            timeout: Duration::from_secs(5),
        };
        BackendClient::new(&settings).expect("client")
    }

    fn token() -> AdminToken {
        AdminToken::parse("secret-token").expect("token")
    }

    fn item_json(id: &str, published: bool) -> serde_json::Value {
        json!({
            "_id": id,
            "page": "seminars",
            "section": "featured",
            "type": "Briefing",
            "title": "Grid storage",
            "author": "R. Ames",
            "date": "March 2024",
            "imageUrl": "",
            "excerpt": "",
            "body": "",
            "sortOrder": 0,
            "isPublished": published
        })
    }

    #[tokio::test]
    async fn topic_listing_sends_bearer_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/api/institutions/seminars/admin")
                .header("authorization", "Bearer secret-token");
            then.status(200).json_body(json!([item_json("a1", false)]));
        });

        let items = client(&server)
            .topic("seminars")
            .list(&token())
            .await
            .expect("listing");
        mock.assert();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a1");
    }

    #[tokio::test]
    async fn wrapped_listings_are_unwrapped() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/api/admin/research");
            then.status(200).json_body(json!({ "data": [] }));
        });

        let items = client(&server)
            .research()
            .list(&token())
            .await
            .expect("listing");
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn create_posts_full_payload() {
        let server = MockServer::start();
        let payload = ContentPayload {
            page: "seminars".into(),
            section: Section::Featured,
            title: "Grid storage".into(),
            author: "R. Ames".into(),
            is_published: true,
            ..ContentPayload::default()
        };
        let mock = server.mock(|when, then| {
            when.method("POST")
                .path("/api/institutions/seminars/admin")
                .json_body_includes(r#"{"section":"featured","isPublished":true}"#);
            then.status(201).json_body(item_json("new1", true));
        });

        let created = client(&server)
            .topic("seminars")
            .create(&token(), &payload)
            .await
            .expect("created");
        mock.assert();
        assert_eq!(created.id, "new1");
    }

    #[tokio::test]
    async fn visibility_toggle_sends_only_the_flag() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("PUT")
                .path("/api/admin/hot-topics/h1")
                .json_body(json!({ "isPublished": false }));
            then.status(200).json_body(json!({
                "id": "h1",
                "title": "Heat",
                "author": "L. Chen",
                "isPublished": false
            }));
        });

        let updated = client(&server)
            .hot_topics()
            .set_visibility(&token(), "h1", false)
            .await
            .expect("patched");
        mock.assert();
        assert!(!updated.is_published);
    }

    #[tokio::test]
    async fn failures_surface_server_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("DELETE").path("/api/events/e1");
            then.status(409).json_body(json!({ "message": "Event has registrations" }));
        });

        let err = AdminCollections::events(&client(&server))
            .delete(&token(), "e1")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.user_message(), "Event has registrations");
    }

    #[tokio::test]
    async fn failures_without_message_use_generic_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/api/institutions/adaptation/public");
            then.status(500).body("oops");
        });

        let err = client(&server)
            .topic_content("adaptation")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Request failed (500)");
    }

    #[tokio::test]
    async fn public_events_drop_drafts() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/api/events");
            then.status(200).json_body(json!([
                { "id": "e1", "title": "Forum", "isPublished": true },
                { "id": "e2", "title": "Draft", "isPublished": false }
            ]));
        });

        let events = PublicApi::events(&client(&server)).await.expect("events");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "e1");
    }

    #[tokio::test]
    async fn callback_status_update_targets_item() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("PUT")
                .path("/api/callback-requests/admin/c1")
                .json_body(json!({ "status": "contacted" }));
            then.status(200).json_body(json!({
                "id": "c1",
                "subject": "Membership",
                "reason": "Pricing",
                "country": "Kenya",
                "email": "a@b.co",
                "status": "contacted"
            }));
        });

        let updated = client(&server)
            .set_callback_status(&token(), "c1", RequestStatus::Contacted)
            .await
            .expect("updated");
        mock.assert();
        assert_eq!(updated.status, RequestStatus::Contacted);
    }

    #[tokio::test]
    async fn login_returns_token_and_identity() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("POST")
                .path("/api/auth/login")
                .json_body(json!({ "email": "admin@civitas.org", "password": "pw" }));
            then.status(200).json_body(json!({
                "token": "t0k",
                "admin": { "email": "admin@civitas.org" }
            }));
        });

        let response = client(&server)
            .login(&LoginRequest {
                email: "admin@civitas.org".into(),
                password: "pw".into(),
            })
            .await
            .expect("login");
        assert_eq!(response.token, "t0k");
    }

    #[tokio::test]
    async fn sign_forwards_folder_hint() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST")
                .path("/api/admin/cloudinary/sign")
                .json_body(json!({ "folder": "topics" }));
            then.status(200).json_body(json!({
                "folder": "topics",
                "signature": "abc",
                "timestamp": 1700000000,
                "apiKey": "k",
                "cloudName": "demo"
            }));
        });

        let ticket = client(&server)
            .sign(&token(), Some("topics"))
            .await
            .expect("ticket");
        mock.assert();
        assert_eq!(ticket.cloud_name, "demo");
        assert_eq!(ticket.upload_preset, None);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let settings = BackendSettings {
            base_url: "http://127.0.0.1:9/".parse().expect("url"),
            timeout: Duration::from_secs(2),
        };
        let client = BackendClient::new(&settings).expect("client");
        let err = AdminCollections::plans(&client)
            .list(&token())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BackendError::Transport(_) | BackendError::Timeout
        ));
    }
}
