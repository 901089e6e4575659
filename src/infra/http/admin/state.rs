use std::sync::Arc;

use crate::application::{
    backend::{AdminCollections, RequestsApi},
    session::LoginService,
    uploads::UploadGateway,
    workspaces::AdminWorkspaces,
};

#[derive(Clone)]
pub struct AdminState {
    pub collections: Arc<dyn AdminCollections>,
    pub requests: Arc<dyn RequestsApi>,
    pub login: Arc<LoginService>,
    pub uploads: Arc<UploadGateway>,
    pub workspaces: Arc<AdminWorkspaces>,
    /// Mount point of the admin subtree, e.g. `/admin`. Never ends with `/`.
    pub base_path: String,
    pub secure_cookies: bool,
    /// Media-host folder requested when signing uploads.
    pub media_folder: Option<String>,
}

impl AdminState {
    pub(super) fn href(&self, path: &str) -> String {
        format!("{}{path}", self.base_path)
    }
}
