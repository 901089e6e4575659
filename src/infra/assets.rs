//! Stylesheets and images compiled into the binary.

use axum::{
    body::Body,
    extract::Path,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use include_dir::{Dir, include_dir};

use crate::application::error::ErrorReport;

static ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

const CACHE_CONTROL: &str = "public, max-age=3600";

/// Serve one embedded file. Both listeners mount this under `/static`.
pub async fn serve(Path(path): Path<String>) -> Response {
    match lookup(&path) {
        Some((bytes, mime)) => asset_response(bytes, mime),
        None => {
            let mut response = StatusCode::NOT_FOUND.into_response();
            ErrorReport::from_message(
                "infra::assets::serve",
                StatusCode::NOT_FOUND,
                format!("Static asset `{path}` not found"),
            )
            .attach(&mut response);
            response
        }
    }
}

fn lookup(path: &str) -> Option<(Bytes, String)> {
    let candidate = path.trim_start_matches('/');
    if candidate.is_empty() || candidate.ends_with('/') || candidate.contains("..") {
        return None;
    }
    let file = ASSETS.get_file(candidate)?;
    let mime = mime_guess::from_path(candidate)
        .first_or_octet_stream()
        .to_string();
    Some((Bytes::from_static(file.contents()), mime))
}

fn asset_response(bytes: Bytes, mime: String) -> Response {
    let mut response = Response::new(Body::from(bytes));
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&mime) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheets_are_embedded() {
        let (bytes, mime) = lookup("site.css").expect("site stylesheet");
        assert!(!bytes.is_empty());
        assert_eq!(mime, "text/css");
        assert!(lookup("/admin.css").is_some());
    }

    #[test]
    fn traversal_and_directories_are_refused() {
        assert!(lookup("../Cargo.toml").is_none());
        assert!(lookup("").is_none());
        assert!(lookup("nested/").is_none());
        assert!(lookup("missing.css").is_none());
    }
}
