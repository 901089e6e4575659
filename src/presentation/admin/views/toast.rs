use askama::Template;

#[derive(Clone)]
pub struct ToastView {
    pub id: String,
    pub tone: &'static str,
    pub text: String,
    pub ttl_ms: u64,
}

#[derive(Template)]
#[template(path = "admin/toasts.html")]
pub struct AdminToastsTemplate {
    pub toasts: Vec<ToastView>,
}
