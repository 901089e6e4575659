//! Public topic hub view state.

use std::sync::Arc;

use civitas_api_types::ContentItem;
use tracing::warn;

use crate::application::backend::PublicApi;
use crate::domain::content::SectionBuckets;
use crate::domain::error::DomainError;
use crate::domain::topics::TopicHub;

/// What a topic hub renders: three zones, an optional fetch error and at most
/// one open item.
#[derive(Debug, Clone)]
pub struct TopicView {
    pub hub: &'static TopicHub,
    pub buckets: SectionBuckets,
    pub error: Option<String>,
    open: Option<String>,
}

impl TopicView {
    pub fn open_item(&self) -> Option<&ContentItem> {
        self.open
            .as_deref()
            .and_then(|id| self.buckets.find(id))
    }

    /// Open one item, replacing whichever was open before.
    pub fn open(&mut self, id: &str) -> Result<&ContentItem, DomainError> {
        if self.buckets.find(id).is_none() {
            return Err(DomainError::not_found("post"));
        }
        self.open = Some(id.to_string());
        self.open_item()
            .ok_or_else(|| DomainError::invariant("opened item vanished"))
    }

    pub fn close(&mut self) {
        self.open = None;
    }
}

#[derive(Clone)]
pub struct TopicReader {
    api: Arc<dyn PublicApi>,
}

impl TopicReader {
    pub fn new(api: Arc<dyn PublicApi>) -> Self {
        Self { api }
    }

    /// Fetch the hub's public payload. Failures leave every zone empty and
    /// carry the message shown inline; there is no retry.
    pub async fn load(&self, hub: &'static TopicHub) -> TopicView {
        match self.api.topic_content(hub.slug).await {
            Ok(content) => TopicView {
                hub,
                buckets: SectionBuckets::from_public(content),
                error: None,
                open: None,
            },
            Err(err) => {
                warn!(
                    target = "civitas::application::reader",
                    page = hub.slug,
                    error = %err,
                    "topic content fetch failed"
                );
                TopicView {
                    hub,
                    buckets: SectionBuckets::default(),
                    error: Some(err.user_message()),
                    open: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use civitas_api_types::{
        CallbackSubmission, Event, MembershipPlan, MembershipSubmission, PublicContent, Section,
    };

    use super::*;
    use crate::application::backend::BackendError;
    use crate::domain::records::fixtures::post;
    use crate::domain::topics::find_hub;

    struct StaticPublic(Result<PublicContent, BackendError>);

    #[async_trait]
    impl PublicApi for StaticPublic {
        async fn topic_content(&self, _page: &str) -> Result<PublicContent, BackendError> {
            self.0.clone()
        }

        async fn events(&self) -> Result<Vec<Event>, BackendError> {
            Ok(Vec::new())
        }

        async fn plans(&self) -> Result<Vec<MembershipPlan>, BackendError> {
            Ok(Vec::new())
        }

        async fn submit_callback(&self, _: &CallbackSubmission) -> Result<(), BackendError> {
            Ok(())
        }

        async fn submit_membership(&self, _: &MembershipSubmission) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn reader(result: Result<PublicContent, BackendError>) -> TopicReader {
        TopicReader::new(Arc::new(StaticPublic(result)))
    }

    fn hub() -> &'static TopicHub {
        find_hub("seminars").expect("registered")
    }

    #[tokio::test]
    async fn at_most_one_item_is_open() {
        let content = PublicContent {
            featured: vec![post("f", Section::Featured, 0, true)],
            latest: vec![post("l", Section::Latest, 0, true)],
            archive: vec![post("a", Section::Archive, 0, true)],
        };
        let mut view = reader(Ok(content)).load(hub()).await;
        assert!(view.open_item().is_none());

        view.open("f").expect("open featured");
        let open = view.open("a").expect("open archive");
        assert_eq!(open.id, "a");
        assert_eq!(view.open_item().map(|item| item.id.as_str()), Some("a"));

        view.close();
        assert!(view.open_item().is_none());
    }

    #[tokio::test]
    async fn unknown_or_unpublished_items_cannot_be_opened() {
        let content = PublicContent {
            latest: vec![post("draft", Section::Latest, 0, false)],
            ..PublicContent::default()
        };
        let mut view = reader(Ok(content)).load(hub()).await;
        assert!(view.open("draft").is_err());
        assert!(view.open("missing").is_err());
    }

    #[tokio::test]
    async fn failed_fetch_leaves_zones_empty_with_message() {
        let view = reader(Err(BackendError::from_status(
            503,
            br#"{"error":"Maintenance"}"#,
        )))
        .load(hub())
        .await;
        assert!(view.buckets.is_empty());
        assert_eq!(view.error.as_deref(), Some("Maintenance"));
    }
}
