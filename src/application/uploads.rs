//! Signed image uploads.
//!
//! The backend signs a short-lived ticket and the binary goes straight to the
//! media host. Admin forms check the image policy first, so a rejected file
//! never causes a signing request.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use civitas_api_types::{UploadTicket, UploadedImage};
use metrics::counter;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::backend::{BackendError, UploadSigner};
use crate::application::session::AdminToken;
use crate::domain::uploads::{ImagePolicy, ImageRejection};

/// Progress callback receiving whole percentages in `0..=100`.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ImageFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct MediaError {
    pub status: Option<u16>,
    pub message: String,
}

/// Direct-to-host binary upload using a signed ticket.
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(
        &self,
        ticket: &UploadTicket,
        file: &ImageFile,
        progress: ProgressFn,
    ) -> Result<UploadedImage, MediaError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error(transparent)]
    Rejected(#[from] ImageRejection),
    #[error("could not sign upload: {0}")]
    Sign(#[from] BackendError),
    #[error(transparent)]
    Media(#[from] MediaError),
}

impl UploadError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(rejection) => rejection.to_string(),
            Self::Sign(err) => err.user_message(),
            Self::Media(err) => err.message.clone(),
        }
    }
}

#[derive(Clone)]
pub struct UploadGateway {
    signer: Arc<dyn UploadSigner>,
    media: Arc<dyn MediaHost>,
    policy: ImagePolicy,
}

impl UploadGateway {
    pub fn new(signer: Arc<dyn UploadSigner>, media: Arc<dyn MediaHost>, policy: ImagePolicy) -> Self {
        Self {
            signer,
            media,
            policy,
        }
    }

    pub fn policy(&self) -> &ImagePolicy {
        &self.policy
    }

    /// Check the policy, then sign and upload.
    pub async fn attach_image(
        &self,
        token: &AdminToken,
        file: &ImageFile,
        folder: Option<&str>,
        progress: ProgressFn,
    ) -> Result<UploadedImage, UploadError> {
        self.policy.check(&file.content_type, file.size())?;
        let image = self.upload(token, file, folder, progress).await;
        let outcome = if image.is_ok() { "ok" } else { "error" };
        counter!("civitas_uploads_total", "outcome" => outcome).increment(1);
        image
    }

    /// Sign and upload without consulting the policy.
    pub async fn upload(
        &self,
        token: &AdminToken,
        file: &ImageFile,
        folder: Option<&str>,
        progress: ProgressFn,
    ) -> Result<UploadedImage, UploadError> {
        let ticket = self.signer.sign(token, folder).await?;
        debug!(
            target = "civitas::application::uploads",
            cloud = %ticket.cloud_name,
            folder = %ticket.folder,
            "upload ticket issued"
        );

        progress(0);
        let image = self.media.upload(&ticket, file, progress.clone()).await?;
        progress(100);

        info!(
            target = "civitas::application::uploads",
            public_id = %image.public_id,
            bytes = file.size(),
            "image uploaded"
        );
        Ok(image)
    }
}
