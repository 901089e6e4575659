//! Admin session handling.
//!
//! The backend issues a bearer token on login. The admin listener keeps it
//! in a session cookie and treats its presence as the only admission rule.

use std::fmt;
use std::sync::Arc;

use civitas_api_types::LoginRequest;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use crate::application::backend::{AuthApi, BackendError};

pub const SESSION_COOKIE: &str = "civitas_admin";
pub const IDENTITY_COOKIE: &str = "civitas_admin_email";

/// Bearer token issued by the backend for one admin session.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminToken(String);

impl AdminToken {
    /// Blank values are treated as an absent token.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable key for per-session server state that never exposes the token itself.
    pub fn session_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminToken(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub token: AdminToken,
    pub email: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardRejection {
    #[error("admin session token missing")]
    MissingToken,
}

/// Presence-only admission: any non-blank token is accepted.
pub fn admit(token: Option<&str>, email: Option<&str>) -> Result<AdminSession, GuardRejection> {
    let token = token
        .and_then(AdminToken::parse)
        .ok_or(GuardRejection::MissingToken)?;
    Ok(AdminSession {
        token,
        email: email
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_string),
    })
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Please enter your email and password.")]
    MissingCredentials,
    #[error("{}", .0.user_message())]
    Backend(#[from] BackendError),
    #[error("The server did not issue a session token.")]
    EmptyToken,
}

#[derive(Clone)]
pub struct LoginService {
    auth: Arc<dyn AuthApi>,
}

impl LoginService {
    pub fn new(auth: Arc<dyn AuthApi>) -> Self {
        Self { auth }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AdminSession, LoginError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let response = self
            .auth
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        let token = AdminToken::parse(&response.token).ok_or(LoginError::EmptyToken)?;
        info!(
            target = "civitas::application::session",
            admin = %response.admin.email,
            "admin signed in"
        );

        Ok(AdminSession {
            token,
            email: Some(response.admin.email),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use civitas_api_types::{AdminIdentity, LoginResponse};

    use super::*;

    struct CountingAuth {
        calls: AtomicUsize,
        token: &'static str,
    }

    #[async_trait]
    impl AuthApi for CountingAuth {
        async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.password == "wrong" {
                return Err(BackendError::from_status(
                    401,
                    br#"{"message":"Invalid credentials"}"#,
                ));
            }
            Ok(LoginResponse {
                token: self.token.to_string(),
                admin: AdminIdentity {
                    email: request.email.clone(),
                },
            })
        }
    }

    fn service(token: &'static str) -> (LoginService, Arc<CountingAuth>) {
        let auth = Arc::new(CountingAuth {
            calls: AtomicUsize::new(0),
            token,
        });
        (LoginService::new(auth.clone()), auth)
    }

    #[test]
    fn guard_requires_a_non_blank_token() {
        assert_eq!(admit(None, None), Err(GuardRejection::MissingToken));
        assert_eq!(admit(Some("  "), None), Err(GuardRejection::MissingToken));
        let session = admit(Some("tok"), Some(" ops@example.org ")).expect("admitted");
        assert_eq!(session.token.as_str(), "tok");
        assert_eq!(session.email.as_deref(), Some("ops@example.org"));
    }

    #[test]
    fn session_key_hides_the_token() {
        let token = AdminToken::parse("secret-token").expect("token");
        let key = token.session_key();
        assert_eq!(key.len(), 64);
        assert!(!key.contains("secret"));
        assert_eq!(format!("{token:?}"), "AdminToken(..)");
    }

    #[tokio::test]
    async fn blank_credentials_never_reach_the_backend() {
        let (service, auth) = service("tok");
        let err = service.login(" ", "pw").await.unwrap_err();
        assert!(matches!(err, LoginError::MissingCredentials));
        assert_eq!(auth.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_rejection_surfaces_server_message() {
        let (service, _) = service("tok");
        let err = service.login("ops@example.org", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");

        let session = service
            .login("ops@example.org", "right")
            .await
            .expect("login");
        assert_eq!(session.email.as_deref(), Some("ops@example.org"));
    }

    #[tokio::test]
    async fn empty_token_is_refused() {
        let (service, _) = service("");
        let err = service.login("ops@example.org", "pw").await.unwrap_err();
        assert!(matches!(err, LoginError::EmptyToken));
    }
}
