//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::NonZeroU64,
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::domain::uploads::{DEFAULT_IMAGE_TYPES, DEFAULT_MAX_IMAGE_BYTES};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "civitas";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_ADMIN_HOST: &str = "127.0.0.1";
const DEFAULT_PUBLIC_PORT: u16 = 3000;
const DEFAULT_ADMIN_PORT: u16 = 3001;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MEDIA_UPLOAD_URL: &str = "https://api.cloudinary.com/v1_1/";
const DEFAULT_MEDIA_FOLDER: &str = "civitas";
const DEFAULT_MEDIA_TIMEOUT_SECS: u64 = 120;
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;
const DEFAULT_ADMIN_BASE_PATH: &str = "/admin";
const DEFAULT_ADMIN_EDITOR_IDLE_SECS: u64 = 60 * 60;

/// Command-line arguments for the civitas binary.
#[derive(Debug, Parser)]
#[command(name = "civitas", version, about = "Civitas public site and admin console")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "CIVITAS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the public and admin HTTP listeners.
    Serve(Box<ServeArgs>),
    /// Probe the backend once and report whether it answers.
    #[command(name = "check-backend")]
    CheckBackend(BackendOverride),
}

#[derive(Debug, Args, Default, Clone)]
pub struct BackendOverride {
    /// Override the backend origin.
    #[arg(long = "backend-url", env = "VITE_API_BASE_URL", value_name = "URL")]
    pub backend_url: Option<String>,

    /// Override the backend request timeout.
    #[arg(long = "backend-timeout-seconds", value_name = "SECONDS")]
    pub backend_timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub backend: BackendOverride,

    /// Override the public listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the administrative listener host.
    #[arg(long = "server-admin-host", value_name = "HOST")]
    pub server_admin_host: Option<String>,

    /// Override the public listener port.
    #[arg(long = "server-public-port", value_name = "PORT")]
    pub public_port: Option<u16>,

    /// Override the administrative listener port.
    #[arg(long = "server-admin-port", value_name = "PORT")]
    pub admin_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the media host upload endpoint.
    #[arg(long = "media-upload-url", value_name = "URL")]
    pub media_upload_url: Option<String>,

    /// Override the largest accepted image in bytes.
    #[arg(long = "uploads-max-image-bytes", value_name = "BYTES")]
    pub uploads_max_image_bytes: Option<u64>,

    /// Override the admin path prefix.
    #[arg(long = "admin-base-path", value_name = "PATH")]
    pub admin_base_path: Option<String>,

    /// Mark the admin session cookie `Secure`.
    #[arg(
        long = "admin-secure-cookies",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub admin_secure_cookies: Option<bool>,

    /// Override how long an unused admin editor is kept, in seconds.
    #[arg(long = "admin-editor-idle-seconds", value_name = "SECONDS")]
    pub admin_editor_idle_seconds: Option<u64>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub backend: BackendSettings,
    pub media: MediaSettings,
    pub uploads: UploadSettings,
    pub admin: AdminSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub public_addr: SocketAddr,
    pub admin_addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Origin of the REST backend; paths are joined onto it.
    pub base_url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct MediaSettings {
    /// Upload endpoint prefix; the ticket's cloud name is appended.
    pub upload_url: Url,
    pub default_folder: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub max_image_bytes: NonZeroU64,
    pub allowed_types: Vec<String>,
    /// Body limit for multipart requests on the admin listener.
    pub max_request_bytes: NonZeroU64,
}

#[derive(Debug, Clone)]
pub struct AdminSettings {
    pub base_path: String,
    pub secure_cookies: bool,
    /// Editors untouched for this long are dropped.
    pub editor_idle: Duration,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("CIVITAS").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::CheckBackend(backend)) => raw.apply_backend_override(backend),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    backend: RawBackendSettings,
    media: RawMediaSettings,
    uploads: RawUploadSettings,
    admin: RawAdminSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(host) = overrides.server_admin_host.as_ref() {
            self.server.admin_host = Some(host.clone());
        }
        if let Some(port) = overrides.public_port {
            self.server.public_port = Some(port);
        }
        if let Some(port) = overrides.admin_port {
            self.server.admin_port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.media_upload_url.as_ref() {
            self.media.upload_url = Some(url.clone());
        }
        if let Some(bytes) = overrides.uploads_max_image_bytes {
            self.uploads.max_image_bytes = Some(bytes);
        }
        if let Some(path) = overrides.admin_base_path.as_ref() {
            self.admin.base_path = Some(path.clone());
        }
        if let Some(secure) = overrides.admin_secure_cookies {
            self.admin.secure_cookies = Some(secure);
        }
        if let Some(seconds) = overrides.admin_editor_idle_seconds {
            self.admin.editor_idle_seconds = Some(seconds);
        }
        self.apply_backend_override(&overrides.backend);
    }

    fn apply_backend_override(&mut self, overrides: &BackendOverride) {
        if let Some(url) = overrides.backend_url.as_ref() {
            self.backend.base_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.backend_timeout_seconds {
            self.backend.timeout_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            backend,
            media,
            uploads,
            admin,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            backend: build_backend_settings(backend)?,
            media: build_media_settings(media)?,
            uploads: build_upload_settings(uploads)?,
            admin: build_admin_settings(admin)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let admin_host = server
        .admin_host
        .unwrap_or_else(|| DEFAULT_ADMIN_HOST.to_string());

    let public_port = server.public_port.unwrap_or(DEFAULT_PUBLIC_PORT);
    if public_port == 0 {
        return Err(LoadError::invalid(
            "server.public_port",
            "port must be greater than zero",
        ));
    }

    let admin_port = server.admin_port.unwrap_or(DEFAULT_ADMIN_PORT);
    if admin_port == 0 {
        return Err(LoadError::invalid(
            "server.admin_port",
            "port must be greater than zero",
        ));
    }

    let public_addr = parse_socket_addr(&host, public_port)
        .map_err(|reason| LoadError::invalid("server.public_addr", reason))?;
    let admin_addr = parse_socket_addr(&admin_host, admin_port)
        .map_err(|reason| LoadError::invalid("server.admin_addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    let graceful_shutdown = positive_secs(graceful_secs, "server.graceful_shutdown_seconds")?;

    Ok(ServerSettings {
        public_addr,
        admin_addr,
        graceful_shutdown,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_backend_settings(backend: RawBackendSettings) -> Result<BackendSettings, LoadError> {
    let raw_url = backend
        .base_url
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
    let base_url = parse_http_url(&raw_url, "backend.base_url")?;

    let timeout = positive_secs(
        backend
            .timeout_seconds
            .unwrap_or(DEFAULT_BACKEND_TIMEOUT_SECS),
        "backend.timeout_seconds",
    )?;

    Ok(BackendSettings { base_url, timeout })
}

fn build_media_settings(media: RawMediaSettings) -> Result<MediaSettings, LoadError> {
    let raw_url = media
        .upload_url
        .unwrap_or_else(|| DEFAULT_MEDIA_UPLOAD_URL.to_string());
    let upload_url = parse_http_url(&raw_url, "media.upload_url")?;

    let default_folder = media
        .default_folder
        .map(|folder| folder.trim().trim_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_MEDIA_FOLDER.to_string());
    if default_folder.is_empty() {
        return Err(LoadError::invalid(
            "media.default_folder",
            "folder must not be empty",
        ));
    }

    let timeout = positive_secs(
        media.timeout_seconds.unwrap_or(DEFAULT_MEDIA_TIMEOUT_SECS),
        "media.timeout_seconds",
    )?;

    Ok(MediaSettings {
        upload_url,
        default_folder,
        timeout,
    })
}

fn build_upload_settings(uploads: RawUploadSettings) -> Result<UploadSettings, LoadError> {
    let max_image_value = uploads.max_image_bytes.unwrap_or(DEFAULT_MAX_IMAGE_BYTES);
    let max_image_bytes = NonZeroU64::new(max_image_value).ok_or_else(|| {
        LoadError::invalid("uploads.max_image_bytes", "must be greater than zero")
    })?;

    let request_value = max_image_value.saturating_add(MULTIPART_OVERHEAD_BYTES);
    usize::try_from(request_value).map_err(|_| {
        LoadError::invalid(
            "uploads.max_image_bytes",
            "value exceeds supported range for usize",
        )
    })?;
    let max_request_bytes = NonZeroU64::new(request_value).ok_or_else(|| {
        LoadError::invalid("uploads.max_image_bytes", "must be greater than zero")
    })?;

    let allowed_types: Vec<String> = uploads
        .allowed_types
        .unwrap_or_else(|| DEFAULT_IMAGE_TYPES.iter().map(|ty| ty.to_string()).collect())
        .into_iter()
        .map(|ty| ty.trim().to_ascii_lowercase())
        .filter(|ty| !ty.is_empty())
        .collect();
    if allowed_types.is_empty() {
        return Err(LoadError::invalid(
            "uploads.allowed_types",
            "at least one content type is required",
        ));
    }
    if let Some(bad) = allowed_types.iter().find(|ty| !ty.starts_with("image/")) {
        return Err(LoadError::invalid(
            "uploads.allowed_types",
            format!("`{bad}` is not an image type"),
        ));
    }

    Ok(UploadSettings {
        max_image_bytes,
        allowed_types,
        max_request_bytes,
    })
}

fn build_admin_settings(admin: RawAdminSettings) -> Result<AdminSettings, LoadError> {
    let raw = admin
        .base_path
        .unwrap_or_else(|| DEFAULT_ADMIN_BASE_PATH.to_string());
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(LoadError::invalid(
            "admin.base_path",
            "path must not be empty or `/`",
        ));
    }
    if !trimmed.starts_with('/') || trimmed.contains(char::is_whitespace) {
        return Err(LoadError::invalid(
            "admin.base_path",
            "path must start with `/` and contain no whitespace",
        ));
    }

    let editor_idle = positive_secs(
        admin
            .editor_idle_seconds
            .unwrap_or(DEFAULT_ADMIN_EDITOR_IDLE_SECS),
        "admin.editor_idle_seconds",
    )?;

    Ok(AdminSettings {
        base_path: trimmed.to_string(),
        secure_cookies: admin.secure_cookies.unwrap_or(false),
        editor_idle,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    admin_host: Option<String>,
    public_port: Option<u16>,
    admin_port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBackendSettings {
    base_url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMediaSettings {
    upload_url: Option<String>,
    default_folder: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawUploadSettings {
    max_image_bytes: Option<u64>,
    allowed_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAdminSettings {
    base_path: Option<String>,
    secure_cookies: Option<bool>,
    editor_idle_seconds: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

/// Parse an http(s) URL and make sure it ends with `/` so relative joins append.
fn parse_http_url(raw: &str, key: &'static str) -> Result<Url, LoadError> {
    let mut url =
        Url::parse(raw).map_err(|err| LoadError::invalid(key, format!("invalid URL: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(key, "URL must use http or https"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn positive_secs(value: u64, key: &'static str) -> Result<Duration, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    Ok(Duration::from_secs(value))
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
