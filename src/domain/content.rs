//! Section partitioning for topic posts.

use civitas_api_types::{ContentItem, PublicContent, Section};

use crate::domain::records::sort_for_display;

/// One page's posts split into the three display zones, each in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionBuckets {
    pub featured: Vec<ContentItem>,
    pub latest: Vec<ContentItem>,
    pub archive: Vec<ContentItem>,
}

impl SectionBuckets {
    /// Group an admin listing by each item's `section` tag. All publish states are kept.
    pub fn from_items(items: impl IntoIterator<Item = ContentItem>) -> Self {
        let mut buckets = Self::default();
        for item in items {
            buckets.bucket_mut(item.section).push(item);
        }
        buckets.sort();
        buckets
    }

    /// Normalise the public aggregation payload.
    ///
    /// Items are kept in the bucket the aggregator placed them in. Unpublished
    /// items are dropped even if the aggregator returned them.
    pub fn from_public(content: PublicContent) -> Self {
        let keep = |items: Vec<ContentItem>| -> Vec<ContentItem> {
            items.into_iter().filter(|item| item.is_published).collect()
        };
        let mut buckets = Self {
            featured: keep(content.featured),
            latest: keep(content.latest),
            archive: keep(content.archive),
        };
        buckets.sort();
        buckets
    }

    pub fn bucket(&self, section: Section) -> &[ContentItem] {
        match section {
            Section::Featured => &self.featured,
            Section::Latest => &self.latest,
            Section::Archive => &self.archive,
        }
    }

    fn bucket_mut(&mut self, section: Section) -> &mut Vec<ContentItem> {
        match section {
            Section::Featured => &mut self.featured,
            Section::Latest => &mut self.latest,
            Section::Archive => &mut self.archive,
        }
    }

    fn sort(&mut self) {
        sort_for_display(&mut self.featured);
        sort_for_display(&mut self.latest);
        sort_for_display(&mut self.archive);
    }

    pub fn find(&self, id: &str) -> Option<&ContentItem> {
        self.featured
            .iter()
            .chain(&self.latest)
            .chain(&self.archive)
            .find(|item| item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.featured.is_empty() && self.latest.is_empty() && self.archive.is_empty()
    }

    pub fn len(&self) -> usize {
        self.featured.len() + self.latest.len() + self.archive.len()
    }
}

/// Split a long-form body into paragraphs, keeping single newlines as line breaks.
pub fn body_paragraphs(body: &str) -> Vec<Vec<&str>> {
    body.split("\n\n")
        .map(|paragraph| paragraph.trim_matches('\n'))
        .filter(|paragraph| !paragraph.trim().is_empty())
        .map(|paragraph| paragraph.split('\n').collect())
        .collect()
}
