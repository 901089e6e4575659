//! reqwest client for the external REST backend.

mod collections;
mod endpoints;

use std::time::Instant;

use bytes::Bytes;
use metrics::{counter, histogram};
use reqwest::{Client, Method, StatusCode, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use url::Url;

use crate::application::backend::BackendError;
use crate::application::session::AdminToken;
use crate::config::BackendSettings;
use crate::infra::error::InfraError;

pub use collections::RestCollection;

#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base: Url,
}

impl BackendClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::backend(format!("failed to build HTTP client: {err}")))?;
        Ok(Self::with_client(client, settings.base_url.clone()))
    }

    pub fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    pub fn user_agent() -> &'static str {
        concat!("civitas/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Base URL with each segment appended and percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::Transport(format!("`{}` cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<B>(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&AdminToken>,
        body: Option<&B>,
    ) -> Result<Bytes, BackendError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.endpoint(segments)?;
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let result = async {
            let response = request.send().await.map_err(map_transport)?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(map_transport)?;
            Ok::<(StatusCode, Bytes), BackendError>((status, bytes))
        }
        .await;
        histogram!("civitas_backend_request_ms", "method" => method.to_string())
            .record(started.elapsed().as_secs_f64() * 1000.0);

        let (status, bytes) = match result {
            Ok(pair) => pair,
            Err(err) => {
                counter!("civitas_backend_requests_total", "method" => method.to_string(), "outcome" => "transport")
                    .increment(1);
                warn!(
                    target = "civitas::infra::backend",
                    %method,
                    path = url.path(),
                    error = %err,
                    "backend request failed"
                );
                return Err(err);
            }
        };

        if !status.is_success() {
            counter!("civitas_backend_requests_total", "method" => method.to_string(), "outcome" => "status")
                .increment(1);
            let err = BackendError::from_status(status.as_u16(), &bytes);
            warn!(
                target = "civitas::infra::backend",
                %method,
                path = url.path(),
                status = status.as_u16(),
                error = %err,
                "backend rejected request"
            );
            return Err(err);
        }

        counter!("civitas_backend_requests_total", "method" => method.to_string(), "outcome" => "ok")
            .increment(1);
        debug!(
            target = "civitas::infra::backend",
            %method,
            path = url.path(),
            status = status.as_u16(),
            "backend request succeeded"
        );
        Ok(bytes)
    }

    pub(crate) async fn fetch<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&AdminToken>,
        body: Option<&B>,
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let bytes = self.execute(method, segments, token, body).await?;
        serde_json::from_slice(&bytes).map_err(|err| BackendError::Decode(err.to_string()))
    }

    /// Fetch a listing that may arrive bare or wrapped in `data`/`items`.
    pub(crate) async fn fetch_list<T>(
        &self,
        segments: &[&str],
        token: Option<&AdminToken>,
    ) -> Result<Vec<T>, BackendError>
    where
        T: DeserializeOwned,
    {
        let listing: Listing<T> = self
            .fetch(Method::GET, segments, token, None::<&()>)
            .await?;
        Ok(listing.into_vec())
    }

    /// Send a request whose response body is ignored.
    pub(crate) async fn send<B>(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&AdminToken>,
        body: Option<&B>,
    ) -> Result<(), BackendError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.execute(method, segments, token, body).await.map(|_| ())
    }

    /// Reachability probe: any HTTP answer from the origin counts.
    pub async fn probe(&self) -> Result<u16, BackendError> {
        let response = self
            .client
            .get(self.base.clone())
            .send()
            .await
            .map_err(map_transport)?;
        Ok(response.status().as_u16())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Data { data: Vec<T> },
    Items { items: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Data { data: items } | Listing::Items { items } => {
                items
            }
        }
    }
}

fn map_transport(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else if err.is_decode() {
        BackendError::Decode(err.to_string())
    } else {
        BackendError::Transport(err.to_string())
    }
}
