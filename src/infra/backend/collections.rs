use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::application::backend::{BackendError, CollectionApi};
use crate::application::session::AdminToken;
use crate::domain::records::Record;

use super::BackendClient;

/// One admin collection addressed by a fixed path prefix.
///
/// Create and list hit the prefix, every per-item call appends the id. The
/// visibility toggle is a partial `PUT` carrying only the flag.
pub struct RestCollection<R> {
    client: BackendClient,
    prefix: Vec<String>,
    _record: PhantomData<fn() -> R>,
}

impl<R> RestCollection<R> {
    pub fn new(client: BackendClient, prefix: &[&str]) -> Self {
        Self {
            client,
            prefix: prefix.iter().map(|segment| segment.to_string()).collect(),
            _record: PhantomData,
        }
    }

    fn path<'a>(&'a self, id: Option<&'a str>) -> Vec<&'a str> {
        let mut segments: Vec<&str> = self.prefix.iter().map(String::as_str).collect();
        segments.extend(id);
        segments
    }
}

#[async_trait]
impl<R> CollectionApi<R> for RestCollection<R>
where
    R: Record + DeserializeOwned,
{
    async fn list(&self, token: &AdminToken) -> Result<Vec<R>, BackendError> {
        self.client.fetch_list(&self.path(None), Some(token)).await
    }

    async fn create(&self, token: &AdminToken, payload: &R::Payload) -> Result<R, BackendError> {
        self.client
            .fetch(Method::POST, &self.path(None), Some(token), Some(payload))
            .await
    }

    async fn update(
        &self,
        token: &AdminToken,
        id: &str,
        payload: &R::Payload,
    ) -> Result<R, BackendError> {
        self.client
            .fetch(Method::PUT, &self.path(Some(id)), Some(token), Some(payload))
            .await
    }

    async fn set_visibility(
        &self,
        token: &AdminToken,
        id: &str,
        visible: bool,
    ) -> Result<R, BackendError> {
        let patch = R::visibility_patch(visible);
        self.client
            .fetch(Method::PUT, &self.path(Some(id)), Some(token), Some(&patch))
            .await
    }

    async fn delete(&self, token: &AdminToken, id: &str) -> Result<(), BackendError> {
        self.client
            .send(Method::DELETE, &self.path(Some(id)), Some(token), None::<&()>)
            .await
    }
}
