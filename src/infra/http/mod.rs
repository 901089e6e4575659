mod admin;
mod middleware;
mod public;

pub use admin::{AdminState, build_admin_router};
pub use public::{PublicState, build_public_router};

use axum::http::HeaderMap;

const DATASTAR_REQUEST_HEADER: &str = "datastar-request";

fn is_datastar_request(headers: &HeaderMap) -> bool {
    headers.contains_key(DATASTAR_REQUEST_HEADER)
}
