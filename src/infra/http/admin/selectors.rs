//! Element ids targeted by admin datastar patches.

pub const COLLECTION_PANEL: &str = "#collection-panel";
pub const REQUESTS_PANEL: &str = "#requests-panel";
pub const TOAST_STACK: &str = "#admin-toasts";
pub const UPLOAD_PROGRESS: &str = "#upload-progress";
