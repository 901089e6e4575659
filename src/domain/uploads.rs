//! Admin image upload rules.

use thiserror::Error;

pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

pub const DEFAULT_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageRejection {
    #[error("Only JPEG, PNG or WebP images can be uploaded.")]
    UnsupportedType { content_type: String },
    #[error("Image must be {limit_mb} MB or smaller.")]
    TooLarge { size: u64, limit_mb: u64 },
    #[error("The selected file is empty.")]
    Empty,
}

/// Accepted content types and maximum size for admin images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePolicy {
    max_bytes: u64,
    allowed_types: Vec<String>,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
            allowed_types: DEFAULT_IMAGE_TYPES.iter().map(|ty| ty.to_string()).collect(),
        }
    }
}

impl ImagePolicy {
    pub fn new(max_bytes: u64, allowed_types: Vec<String>) -> Self {
        Self {
            max_bytes,
            allowed_types: allowed_types
                .into_iter()
                .map(|ty| ty.trim().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    pub fn check(&self, content_type: &str, size: u64) -> Result<(), ImageRejection> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !self.allowed_types.iter().any(|allowed| *allowed == essence) {
            return Err(ImageRejection::UnsupportedType {
                content_type: content_type.to_string(),
            });
        }
        if size == 0 {
            return Err(ImageRejection::Empty);
        }
        if size > self.max_bytes {
            return Err(ImageRejection::TooLarge {
                size,
                limit_mb: self.max_bytes.div_ceil(1024 * 1024),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_images_within_limit() {
        let policy = ImagePolicy::default();
        assert!(policy.check("image/jpeg", 1024).is_ok());
        assert!(policy.check("image/webp; charset=binary", 1024).is_ok());
        assert!(policy.check("IMAGE/PNG", DEFAULT_MAX_IMAGE_BYTES).is_ok());
    }

    #[test]
    fn rejects_oversized_images_with_limit_message() {
        let policy = ImagePolicy::default();
        let err = policy.check("image/jpeg", 15 * 1024 * 1024).unwrap_err();
        assert_eq!(err.to_string(), "Image must be 10 MB or smaller.");
    }

    #[test]
    fn rejects_other_types() {
        let policy = ImagePolicy::default();
        assert!(matches!(
            policy.check("image/gif", 10),
            Err(ImageRejection::UnsupportedType { .. })
        ));
        assert!(policy.check("application/pdf", 10).is_err());
        assert_eq!(policy.check("image/png", 0), Err(ImageRejection::Empty));
    }
}
