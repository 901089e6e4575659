//! Behaviour shared by every admin-managed collection.
//!
//! Topic posts, insights, events and membership plans all carry an opaque
//! store-assigned id, an integer `sortOrder` and a single visibility flag
//! (`isPublished`, or `isActive` for plans). The editors and the public
//! renderer only ever need those three facts, so they are exposed through
//! [`Record`] instead of being re-implemented per collection.

use std::cmp::Ordering;

use civitas_api_types::{
    ActivePatch, ContentItem, ContentPayload, Event, EventPayload, Insight, InsightPayload,
    MembershipPlan, PlanPayload, PublishedPatch,
};
use serde::Serialize;

pub trait Record: Clone + Send + Sync + 'static {
    /// Full-replace body accepted by the collection's create/update endpoints.
    type Payload: Serialize + Clone + Send + Sync + 'static;
    /// Partial body used to flip the visibility flag.
    type VisibilityPatch: Serialize + Send + Sync + 'static;

    const ENTITY: &'static str;

    fn id(&self) -> &str;
    fn sort_order(&self) -> i32;
    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
    fn label(&self) -> &str;

    fn created_at(&self) -> Option<&str> {
        None
    }

    fn visibility_patch(visible: bool) -> Self::VisibilityPatch;
}

/// Display order: ascending `sortOrder`, newest first on ties.
///
/// Newest is judged by `createdAt` when both sides carry it, otherwise by the
/// opaque id compared in reverse. Store ids are time-prefixed, so this
/// approximates reverse insertion without promising it.
pub fn display_order<R: Record>(a: &R, b: &R) -> Ordering {
    a.sort_order()
        .cmp(&b.sort_order())
        .then_with(|| match (a.created_at(), b.created_at()) {
            (Some(left), Some(right)) => right.cmp(left),
            _ => Ordering::Equal,
        })
        .then_with(|| b.id().cmp(a.id()))
}

pub fn sort_for_display<R: Record>(items: &mut [R]) {
    items.sort_by(display_order);
}

impl Record for ContentItem {
    type Payload = ContentPayload;
    type VisibilityPatch = PublishedPatch;

    const ENTITY: &'static str = "post";

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_order(&self) -> i32 {
        self.sort_order
    }

    fn is_visible(&self) -> bool {
        self.is_published
    }

    fn set_visible(&mut self, visible: bool) {
        self.is_published = visible;
    }

    fn label(&self) -> &str {
        &self.title
    }

    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    fn visibility_patch(visible: bool) -> PublishedPatch {
        PublishedPatch {
            is_published: visible,
        }
    }
}

impl Record for Insight {
    type Payload = InsightPayload;
    type VisibilityPatch = PublishedPatch;

    const ENTITY: &'static str = "insight";

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_order(&self) -> i32 {
        self.sort_order
    }

    fn is_visible(&self) -> bool {
        self.is_published
    }

    fn set_visible(&mut self, visible: bool) {
        self.is_published = visible;
    }

    fn label(&self) -> &str {
        &self.title
    }

    fn visibility_patch(visible: bool) -> PublishedPatch {
        PublishedPatch {
            is_published: visible,
        }
    }
}

impl Record for Event {
    type Payload = EventPayload;
    type VisibilityPatch = PublishedPatch;

    const ENTITY: &'static str = "event";

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_order(&self) -> i32 {
        self.sort_order
    }

    fn is_visible(&self) -> bool {
        self.is_published
    }

    fn set_visible(&mut self, visible: bool) {
        self.is_published = visible;
    }

    fn label(&self) -> &str {
        &self.title
    }

    fn visibility_patch(visible: bool) -> PublishedPatch {
        PublishedPatch {
            is_published: visible,
        }
    }
}

impl Record for MembershipPlan {
    type Payload = PlanPayload;
    type VisibilityPatch = ActivePatch;

    const ENTITY: &'static str = "plan";

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_order(&self) -> i32 {
        self.sort_order
    }

    fn is_visible(&self) -> bool {
        self.is_active
    }

    fn set_visible(&mut self, visible: bool) {
        self.is_active = visible;
    }

    fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.plan
        } else {
            &self.title
        }
    }

    fn visibility_patch(visible: bool) -> ActivePatch {
        ActivePatch { is_active: visible }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use civitas_api_types::{ContentItem, ContentKind, Section};

    pub fn post(id: &str, section: Section, sort_order: i32, published: bool) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            page: "seminars".to_string(),
            section,
            kind: ContentKind::Briefing,
            title: format!("Post {id}"),
            subtitle: None,
            author: "Policy desk".to_string(),
            date: "May 2024".to_string(),
            image_url: format!("https://img.example/{id}.jpg"),
            excerpt: "Summary".to_string(),
            body: "First line\nSecond line".to_string(),
            sort_order,
            is_published: published,
            created_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::post;
    use super::*;
    use civitas_api_types::Section;

    #[test]
    fn lower_sort_order_comes_first() {
        let mut items = vec![
            post("a3", Section::Latest, 5, true),
            post("a1", Section::Latest, -1, true),
            post("a2", Section::Latest, 2, true),
        ];
        sort_for_display(&mut items);
        let orders: Vec<i32> = items.iter().map(|item| item.sort_order).collect();
        assert_eq!(orders, vec![-1, 2, 5]);
    }

    #[test]
    fn ties_prefer_newer_records() {
        let mut older = post("0001", Section::Featured, 0, true);
        let mut newer = post("0002", Section::Featured, 0, true);
        let mut items = vec![older.clone(), newer.clone()];
        sort_for_display(&mut items);
        assert_eq!(items[0].id, "0002");

        older.created_at = Some("2024-05-02T10:00:00Z".into());
        newer.created_at = Some("2024-05-01T10:00:00Z".into());
        let mut items = vec![newer, older];
        sort_for_display(&mut items);
        assert_eq!(items[0].id, "0001", "createdAt outranks id ordering");
    }

    #[test]
    fn plan_label_falls_back_to_plan_name() {
        let plan = MembershipPlan {
            id: "p1".into(),
            subject: String::new(),
            plan: "Corporate".into(),
            title: String::new(),
            short: String::new(),
            intro: String::new(),
            price: 0.0,
            billing: Default::default(),
            features: Vec::new(),
            images: Vec::new(),
            is_active: false,
            sort_order: 0,
        };
        assert_eq!(plan.label(), "Corporate");
        assert_eq!(
            serde_json::to_value(MembershipPlan::visibility_patch(true)).unwrap(),
            serde_json::json!({"isActive": true})
        );
    }
}
