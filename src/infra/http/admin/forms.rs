//! Editor form payloads.
//!
//! Editor forms are posted as multipart so that the image picker can travel
//! with the rest of the fields. Text fields land in [`EditorFields`]; a
//! non-empty `image` part becomes an [`ImageFile`].

use std::collections::HashMap;
use std::str::FromStr;

use axum::http::StatusCode;
use axum_extra::extract::Multipart;
use bytes::Bytes;
use thiserror::Error;
use tracing::warn;

use crate::application::uploads::ImageFile;

const IMAGE_FIELD: &str = "image";

#[derive(Debug, Error)]
pub(super) enum FormError {
    #[error("The upload is too large.")]
    TooLarge,
    #[error("The form could not be read.")]
    Malformed,
}

#[derive(Debug, Default, Clone)]
pub(super) struct EditorFields {
    values: HashMap<String, String>,
}

impl EditorFields {
    #[cfg(test)]
    pub(super) fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    pub(super) fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw text, untrimmed. Missing fields read as empty.
    pub(super) fn text(&self, name: &str) -> String {
        self.values.get(name).cloned().unwrap_or_default()
    }

    /// Checkboxes are present only when ticked.
    pub(super) fn flag(&self, name: &str) -> bool {
        self.values
            .get(name)
            .is_some_and(|value| matches!(value.as_str(), "on" | "true" | "1"))
    }

    /// Blank or unknown values read as unselected.
    pub(super) fn choice<T: FromStr>(&self, name: &str) -> Option<T> {
        self.values
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .and_then(|value| value.parse().ok())
    }
}

#[derive(Debug, Default)]
pub(super) struct EditorForm {
    pub fields: EditorFields,
    pub image: Option<ImageFile>,
}

pub(super) async fn read_editor_form(multipart: &mut Multipart) -> Result<EditorForm, FormError> {
    let mut form = EditorForm::default();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return Err(multipart_failure(err.status(), &err.to_string())),
        };
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let filename = field
                .file_name()
                .map(str::to_string)
                .unwrap_or_default();
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let bytes: Bytes = field
                .bytes()
                .await
                .map_err(|err| multipart_failure(err.status(), &err.to_string()))?;
            if filename.trim().is_empty() && bytes.is_empty() {
                continue;
            }
            form.image = Some(ImageFile {
                filename,
                content_type,
                bytes,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|err| multipart_failure(err.status(), &err.to_string()))?;
        form.fields.values.insert(name, value);
    }
    Ok(form)
}

fn multipart_failure(status: StatusCode, detail: &str) -> FormError {
    warn!(
        target = "civitas::http::admin::forms",
        status = status.as_u16(),
        error = detail,
        "failed to read editor form"
    );
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        FormError::TooLarge
    } else {
        FormError::Malformed
    }
}
