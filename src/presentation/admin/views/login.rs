use askama::Template;

#[derive(Clone, Default)]
pub struct LoginView {
    pub action: String,
    pub email: String,
    pub error: Option<String>,
    pub asset_base: String,
}

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub view: LoginView,
}
