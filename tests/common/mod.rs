//! In-memory backend shared by the router tests.

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use civitas::application::{
    backend::{
        AdminCollections, AuthApi, BackendError, CollectionApi, PublicApi, RequestsApi,
        UploadSigner,
    },
    session::{AdminToken, LoginService},
    uploads::{ImageFile, MediaError, MediaHost, ProgressFn, UploadGateway},
    workspaces::AdminWorkspaces,
};
use civitas::domain::uploads::ImagePolicy;
use civitas::infra::http::AdminState;
use civitas_api_types::{
    AdminIdentity, CallbackRequest, CallbackSubmission, ContentItem, ContentPayload, Event,
    Insight, LoginRequest, LoginResponse, MembershipPlan, MembershipRequest,
    MembershipSubmission, PublicContent, RequestStatus, Section, UploadTicket, UploadedImage,
};
use http_body_util::BodyExt;

pub const TOKEN: &str = "tok-123";

/// One shared store standing in for the REST backend. Every admin-only call
/// bumps `admin_calls`.
#[derive(Default)]
pub struct FakeBackend {
    pub items: Mutex<Vec<ContentItem>>,
    pub admin_calls: AtomicUsize,
    pub sign_calls: AtomicUsize,
    pub callbacks_submitted: Mutex<Vec<CallbackSubmission>>,
    pub fail_mutations: bool,
}

impl FakeBackend {
    pub fn admin_calls(&self) -> usize {
        self.admin_calls.load(Ordering::SeqCst)
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.admin_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn mutation_result(&self) -> Result<(), BackendError> {
        if self.fail_mutations {
            Err(BackendError::from_status(500, br#"{"message":"store offline"}"#))
        } else {
            Ok(())
        }
    }
}

pub struct TopicCollection {
    backend: Arc<FakeBackend>,
    page: String,
}

fn item_from(id: String, payload: &ContentPayload) -> ContentItem {
    ContentItem {
        id,
        page: payload.page.clone(),
        section: payload.section,
        kind: payload.kind,
        title: payload.title.clone(),
        subtitle: payload.subtitle.clone(),
        author: payload.author.clone(),
        date: payload.date.clone(),
        image_url: payload.image_url.clone(),
        excerpt: payload.excerpt.clone(),
        body: payload.body.clone(),
        sort_order: payload.sort_order,
        is_published: payload.is_published,
        created_at: None,
    }
}

#[async_trait]
impl CollectionApi<ContentItem> for TopicCollection {
    async fn list(&self, token: &AdminToken) -> Result<Vec<ContentItem>, BackendError> {
        self.backend.touch();
        if token.as_str() != TOKEN {
            return Err(BackendError::from_status(401, br#"{"message":"Invalid session"}"#));
        }
        let items = self.backend.items.lock().expect("store lock");
        Ok(items
            .iter()
            .filter(|item| item.page == self.page)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        _token: &AdminToken,
        payload: &ContentPayload,
    ) -> Result<ContentItem, BackendError> {
        self.backend.touch();
        self.backend.mutation_result()?;
        let mut items = self.backend.items.lock().expect("store lock");
        let item = item_from(format!("item-{}", items.len() + 1), payload);
        items.push(item.clone());
        Ok(item)
    }

    async fn update(
        &self,
        _token: &AdminToken,
        id: &str,
        payload: &ContentPayload,
    ) -> Result<ContentItem, BackendError> {
        self.backend.touch();
        self.backend.mutation_result()?;
        let mut items = self.backend.items.lock().expect("store lock");
        let item = item_from(id.to_string(), payload);
        if let Some(slot) = items.iter_mut().find(|existing| existing.id == id) {
            *slot = item.clone();
        }
        Ok(item)
    }

    async fn set_visibility(
        &self,
        _token: &AdminToken,
        id: &str,
        visible: bool,
    ) -> Result<ContentItem, BackendError> {
        self.backend.touch();
        self.backend.mutation_result()?;
        let mut items = self.backend.items.lock().expect("store lock");
        let item = items
            .iter_mut()
            .find(|existing| existing.id == id)
            .ok_or_else(|| BackendError::from_status(404, b""))?;
        item.is_published = visible;
        Ok(item.clone())
    }

    async fn delete(&self, _token: &AdminToken, id: &str) -> Result<(), BackendError> {
        self.backend.touch();
        self.backend.mutation_result()?;
        self.backend
            .items
            .lock()
            .expect("store lock")
            .retain(|item| item.id != id);
        Ok(())
    }
}

/// A collection with nothing in it, for the editors a test does not exercise.
pub struct EmptyCollection {
    backend: Arc<FakeBackend>,
}

#[async_trait]
impl<R> CollectionApi<R> for EmptyCollection
where
    R: civitas::domain::records::Record,
{
    async fn list(&self, _token: &AdminToken) -> Result<Vec<R>, BackendError> {
        self.backend.touch();
        Ok(Vec::new())
    }

    async fn create(&self, _token: &AdminToken, _payload: &R::Payload) -> Result<R, BackendError> {
        self.backend.touch();
        Err(BackendError::from_status(501, b""))
    }

    async fn update(
        &self,
        _token: &AdminToken,
        _id: &str,
        _payload: &R::Payload,
    ) -> Result<R, BackendError> {
        self.backend.touch();
        Err(BackendError::from_status(501, b""))
    }

    async fn set_visibility(
        &self,
        _token: &AdminToken,
        _id: &str,
        _visible: bool,
    ) -> Result<R, BackendError> {
        self.backend.touch();
        Err(BackendError::from_status(501, b""))
    }

    async fn delete(&self, _token: &AdminToken, _id: &str) -> Result<(), BackendError> {
        self.backend.touch();
        Err(BackendError::from_status(501, b""))
    }
}

pub struct FakeCollections(pub Arc<FakeBackend>);

impl AdminCollections for FakeCollections {
    fn topic(&self, page: &str) -> Arc<dyn CollectionApi<ContentItem>> {
        Arc::new(TopicCollection {
            backend: self.0.clone(),
            page: page.to_string(),
        })
    }

    fn hot_topics(&self) -> Arc<dyn CollectionApi<Insight>> {
        Arc::new(EmptyCollection {
            backend: self.0.clone(),
        })
    }

    fn research(&self) -> Arc<dyn CollectionApi<Insight>> {
        Arc::new(EmptyCollection {
            backend: self.0.clone(),
        })
    }

    fn events(&self) -> Arc<dyn CollectionApi<Event>> {
        Arc::new(EmptyCollection {
            backend: self.0.clone(),
        })
    }

    fn plans(&self) -> Arc<dyn CollectionApi<MembershipPlan>> {
        Arc::new(EmptyCollection {
            backend: self.0.clone(),
        })
    }
}

pub struct FakePublic(pub Arc<FakeBackend>);

/// Groups every stored item by section without filtering, so the site's own
/// filtering is what keeps drafts off the page.
#[async_trait]
impl PublicApi for FakePublic {
    async fn topic_content(&self, page: &str) -> Result<PublicContent, BackendError> {
        let items = self.0.items.lock().expect("store lock");
        let mut content = PublicContent::default();
        for item in items.iter().filter(|item| item.page == page) {
            match item.section {
                Section::Featured => content.featured.push(item.clone()),
                Section::Latest => content.latest.push(item.clone()),
                Section::Archive => content.archive.push(item.clone()),
            }
        }
        Ok(content)
    }

    async fn events(&self) -> Result<Vec<Event>, BackendError> {
        Ok(Vec::new())
    }

    async fn plans(&self) -> Result<Vec<MembershipPlan>, BackendError> {
        Ok(Vec::new())
    }

    async fn submit_callback(&self, request: &CallbackSubmission) -> Result<(), BackendError> {
        self.0
            .callbacks_submitted
            .lock()
            .expect("store lock")
            .push(request.clone());
        Ok(())
    }

    async fn submit_membership(&self, _request: &MembershipSubmission) -> Result<(), BackendError> {
        Ok(())
    }
}

pub struct FakeRequests(pub Arc<FakeBackend>);

#[async_trait]
impl RequestsApi for FakeRequests {
    async fn callbacks(&self, _token: &AdminToken) -> Result<Vec<CallbackRequest>, BackendError> {
        self.0.touch();
        Ok(vec![CallbackRequest {
            id: "cb-1".to_string(),
            subject: "Partnerships".to_string(),
            reason: "Speaking request".to_string(),
            country: "Kenya".to_string(),
            email: Some("ada@example.org".to_string()),
            phone: None,
            message: None,
            status: RequestStatus::New,
            created_at: Some("2025-02-01T10:00:00Z".to_string()),
        }])
    }

    async fn set_callback_status(
        &self,
        _token: &AdminToken,
        _id: &str,
        _status: RequestStatus,
    ) -> Result<CallbackRequest, BackendError> {
        self.0.touch();
        Err(BackendError::from_status(501, b""))
    }

    async fn delete_callback(&self, _token: &AdminToken, _id: &str) -> Result<(), BackendError> {
        self.0.touch();
        Ok(())
    }

    async fn memberships(
        &self,
        _token: &AdminToken,
    ) -> Result<Vec<MembershipRequest>, BackendError> {
        self.0.touch();
        Ok(Vec::new())
    }

    async fn delete_membership(&self, _token: &AdminToken, _id: &str) -> Result<(), BackendError> {
        self.0.touch();
        Ok(())
    }
}

pub struct FakeAuth;

#[async_trait]
impl AuthApi for FakeAuth {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, BackendError> {
        if request.password == "correct horse" {
            Ok(LoginResponse {
                token: TOKEN.to_string(),
                admin: AdminIdentity {
                    email: request.email.clone(),
                },
            })
        } else {
            Err(BackendError::from_status(
                401,
                br#"{"message":"Invalid credentials"}"#,
            ))
        }
    }
}

pub struct FakeSigner(pub Arc<FakeBackend>);

#[async_trait]
impl UploadSigner for FakeSigner {
    async fn sign(
        &self,
        _token: &AdminToken,
        folder: Option<&str>,
    ) -> Result<UploadTicket, BackendError> {
        self.0.sign_calls.fetch_add(1, Ordering::SeqCst);
        Ok(UploadTicket {
            folder: folder.unwrap_or_default().to_string(),
            signature: "sig".to_string(),
            timestamp: 1_700_000_000,
            api_key: "key".to_string(),
            cloud_name: "demo".to_string(),
            upload_preset: None,
        })
    }
}

pub struct FakeMedia;

#[async_trait]
impl MediaHost for FakeMedia {
    async fn upload(
        &self,
        _ticket: &UploadTicket,
        file: &ImageFile,
        progress: ProgressFn,
    ) -> Result<UploadedImage, MediaError> {
        progress(50);
        progress(100);
        Ok(UploadedImage {
            secure_url: format!("https://media.example/{}", file.filename),
            public_id: file.filename.clone(),
        })
    }
}

pub fn admin_state(backend: &Arc<FakeBackend>) -> AdminState {
    AdminState {
        collections: Arc::new(FakeCollections(backend.clone())),
        requests: Arc::new(FakeRequests(backend.clone())),
        login: Arc::new(LoginService::new(Arc::new(FakeAuth))),
        uploads: Arc::new(UploadGateway::new(
            Arc::new(FakeSigner(backend.clone())),
            Arc::new(FakeMedia),
            ImagePolicy::default(),
        )),
        workspaces: Arc::new(AdminWorkspaces::default()),
        base_path: "/admin".to_string(),
        secure_cookies: false,
        media_folder: Some("civitas".to_string()),
    }
}

pub fn session_cookie() -> String {
    format!("civitas_admin={TOKEN}; civitas_admin_email=editor%40example.org")
}

/// Multipart body with text fields and an optional file part.
pub struct MultipartBody {
    boundary: &'static str,
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "civitas-test-boundary",
            bytes: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn finish(mut self) -> (String, Body) {
        self.bytes
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (self.content_type(), Body::from(self.bytes))
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
