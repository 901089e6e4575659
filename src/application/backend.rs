//! Seams to the external REST backend.
//!
//! The backend owns every record. These traits describe what the site needs
//! from it; the reqwest client in `infra::backend` implements them and tests
//! substitute in-memory fakes.

use std::sync::Arc;

use async_trait::async_trait;
use civitas_api_types::{
    CallbackRequest, CallbackSubmission, ContentItem, Event, Insight, LoginRequest, LoginResponse,
    MembershipPlan, MembershipRequest, MembershipSubmission, PublicContent, RequestStatus,
    UploadTicket,
};
use serde_json::Value;
use thiserror::Error;

use crate::application::session::AdminToken;
use crate::domain::records::Record;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend responded {status}: {message}")]
    Status { status: u16, message: String },
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("backend request timed out")]
    Timeout,
    #[error("unexpected backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Build a status error from a non-2xx response body.
    ///
    /// The body's `message` field wins, then a string `error` field, then a
    /// nested `error.message`; otherwise a generic `Request failed (<status>)`.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| extract_error_message(&value))
            .unwrap_or_else(|| format!("Request failed ({status})"));
        Self::Status { status, message }
    }

    /// Text shown in the banner of the view that triggered the request.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Transport(_) => "Could not reach the server. Please try again.".to_string(),
            Self::Timeout => "The server took too long to respond. Please try again.".to_string(),
            Self::Decode(_) => "The server sent an unexpected response.".to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }
}

/// Pull a human message out of either error shape the services emit.
pub fn extract_error_message(value: &Value) -> Option<String> {
    let non_blank = |text: &str| {
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return non_blank(message);
    }
    match value.get("error")? {
        Value::String(error) => non_blank(error),
        Value::Object(error) => error
            .get("message")
            .and_then(Value::as_str)
            .and_then(non_blank),
        _ => None,
    }
}

/// Admin CRUD over one backend collection.
#[async_trait]
pub trait CollectionApi<R: Record>: Send + Sync {
    async fn list(&self, token: &AdminToken) -> Result<Vec<R>, BackendError>;

    async fn create(&self, token: &AdminToken, payload: &R::Payload) -> Result<R, BackendError>;

    async fn update(
        &self,
        token: &AdminToken,
        id: &str,
        payload: &R::Payload,
    ) -> Result<R, BackendError>;

    /// Partial update of the visibility flag only.
    async fn set_visibility(
        &self,
        token: &AdminToken,
        id: &str,
        visible: bool,
    ) -> Result<R, BackendError>;

    async fn delete(&self, token: &AdminToken, id: &str) -> Result<(), BackendError>;
}

/// Hands out the admin collections.
pub trait AdminCollections: Send + Sync {
    fn topic(&self, page: &str) -> Arc<dyn CollectionApi<ContentItem>>;
    fn hot_topics(&self) -> Arc<dyn CollectionApi<Insight>>;
    fn research(&self) -> Arc<dyn CollectionApi<Insight>>;
    fn events(&self) -> Arc<dyn CollectionApi<Event>>;
    fn plans(&self) -> Arc<dyn CollectionApi<MembershipPlan>>;
}

/// Unauthenticated reads and submissions used by the public site.
#[async_trait]
pub trait PublicApi: Send + Sync {
    async fn topic_content(&self, page: &str) -> Result<PublicContent, BackendError>;

    async fn events(&self) -> Result<Vec<Event>, BackendError>;

    async fn plans(&self) -> Result<Vec<MembershipPlan>, BackendError>;

    async fn submit_callback(&self, request: &CallbackSubmission) -> Result<(), BackendError>;

    async fn submit_membership(&self, request: &MembershipSubmission)
    -> Result<(), BackendError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, BackendError>;
}

/// Admin queues of inbound callback and membership requests.
#[async_trait]
pub trait RequestsApi: Send + Sync {
    async fn callbacks(&self, token: &AdminToken) -> Result<Vec<CallbackRequest>, BackendError>;

    async fn set_callback_status(
        &self,
        token: &AdminToken,
        id: &str,
        status: RequestStatus,
    ) -> Result<CallbackRequest, BackendError>;

    async fn delete_callback(&self, token: &AdminToken, id: &str) -> Result<(), BackendError>;

    async fn memberships(&self, token: &AdminToken)
    -> Result<Vec<MembershipRequest>, BackendError>;

    async fn delete_membership(&self, token: &AdminToken, id: &str) -> Result<(), BackendError>;
}

#[async_trait]
pub trait UploadSigner: Send + Sync {
    async fn sign(
        &self,
        token: &AdminToken,
        folder: Option<&str>,
    ) -> Result<UploadTicket, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_prefer_server_message() {
        let err = BackendError::from_status(400, br#"{"message":"Title is required"}"#);
        assert_eq!(err.user_message(), "Title is required");

        let err = BackendError::from_status(403, br#"{"error":"Forbidden"}"#);
        assert_eq!(err.user_message(), "Forbidden");

        let err = BackendError::from_status(422, br#"{"error":{"message":"Bad folder"}}"#);
        assert_eq!(err.user_message(), "Bad folder");
    }

    #[test]
    fn status_errors_fall_back_to_generic_text() {
        let err = BackendError::from_status(502, b"<html>bad gateway</html>");
        assert_eq!(err.user_message(), "Request failed (502)");

        let err = BackendError::from_status(500, br#"{"message":"   "}"#);
        assert_eq!(err.user_message(), "Request failed (500)");
        assert!(!err.is_unauthorized());
        assert!(BackendError::from_status(401, b"{}").is_unauthorized());
    }
}
