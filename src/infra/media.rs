//! Direct uploads to the Cloudinary-compatible media host.

use async_trait::async_trait;
use bytes::Bytes;
use civitas_api_types::{UploadTicket, UploadedImage};
use futures::stream;
use reqwest::{
    Body, Client,
    multipart::{Form, Part},
};
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::application::backend::extract_error_message;
use crate::application::uploads::{ImageFile, MediaError, MediaHost, ProgressFn};
use crate::config::MediaSettings;
use crate::infra::error::InfraError;

const CHUNK_BYTES: usize = 64 * 1024;

#[derive(Clone, Debug)]
pub struct CloudinaryHost {
    client: Client,
    upload_url: Url,
}

impl CloudinaryHost {
    pub fn new(settings: &MediaSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(concat!("civitas/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::backend(format!("failed to build media client: {err}")))?;
        Ok(Self {
            client,
            upload_url: settings.upload_url.clone(),
        })
    }

    fn endpoint(&self, cloud_name: &str) -> Result<Url, MediaError> {
        let mut url = self.upload_url.clone();
        url.path_segments_mut()
            .map_err(|()| MediaError {
                status: None,
                message: "Media upload endpoint is misconfigured.".to_string(),
            })?
            .pop_if_empty()
            .extend([cloud_name, "image", "upload"]);
        Ok(url)
    }
}

/// Split the file into chunks, reporting how much has been handed to the
/// transport. Stops short of 100 so the caller reports completion.
fn progress_body(bytes: Bytes, progress: ProgressFn) -> Body {
    let total = bytes.len().max(1);
    let chunks: Vec<Bytes> = (0..bytes.len())
        .step_by(CHUNK_BYTES)
        .map(|start| bytes.slice(start..(start + CHUNK_BYTES).min(bytes.len())))
        .collect();
    let mut sent = 0usize;
    let mut last = 0u8;
    let stream = stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len();
        let pct = ((sent * 100) / total).min(99) as u8;
        if pct > last {
            last = pct;
            progress(pct);
        }
        Ok::<Bytes, std::io::Error>(chunk)
    }));
    Body::wrap_stream(stream)
}

fn upload_form(ticket: &UploadTicket, file: &ImageFile, progress: ProgressFn) -> Result<Form, MediaError> {
    let body = progress_body(file.bytes.clone(), progress);
    let part = Part::stream_with_length(body, file.size())
        .file_name(file.filename.clone())
        .mime_str(&file.content_type)
        .map_err(|err| MediaError {
            status: None,
            message: format!("Unsupported file type: {err}"),
        })?;

    let mut form = Form::new()
        .part("file", part)
        .text("api_key", ticket.api_key.clone())
        .text("timestamp", ticket.timestamp.to_string())
        .text("signature", ticket.signature.clone());
    if !ticket.folder.trim().is_empty() {
        form = form.text("folder", ticket.folder.clone());
    }
    if let Some(preset) = ticket.upload_preset.as_ref().filter(|p| !p.trim().is_empty()) {
        form = form.text("upload_preset", preset.clone());
    }
    Ok(form)
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(
        &self,
        ticket: &UploadTicket,
        file: &ImageFile,
        progress: ProgressFn,
    ) -> Result<UploadedImage, MediaError> {
        let url = self.endpoint(&ticket.cloud_name)?;
        let form = upload_form(ticket, file, progress)?;

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| {
                warn!(
                    target = "civitas::infra::media",
                    error = %err,
                    "media upload transport failed"
                );
                MediaError {
                    status: None,
                    message: "Upload failed. Please try again.".to_string(),
                }
            })?;

        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&body)
                .ok()
                .and_then(|value| extract_error_message(&value))
                .unwrap_or_else(|| format!("Upload failed ({})", status.as_u16()));
            warn!(
                target = "civitas::infra::media",
                status = status.as_u16(),
                error = %message,
                "media host rejected upload"
            );
            return Err(MediaError {
                status: Some(status.as_u16()),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|err| MediaError {
            status: Some(status.as_u16()),
            message: format!("Unexpected upload response: {err}"),
        })
    }
}
