//! Per-session editor state held by the admin listener.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use civitas_api_types::{Event, Insight, MembershipPlan};
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::application::editor::{CollectionEditor, TopicEditor};
use crate::domain::forms::{ArticleDraft, EventDraft, PlanDraft};
use crate::domain::topics::TopicHub;

pub type SharedEditor<E> = Arc<Mutex<E>>;

struct Slot<E> {
    editor: SharedEditor<E>,
    touched: Instant,
}

impl<E> Slot<E> {
    fn new(editor: SharedEditor<E>) -> Self {
        Self {
            editor,
            touched: Instant::now(),
        }
    }
}

/// Editors keyed by session plus a scope (a topic slug or a collection kind).
///
/// Every lookup refreshes the entry's last-touched time; entries left alone
/// for longer than the idle TTL are removed by [`EditorMap::sweep_idle`].
pub struct EditorMap<K, E> {
    entries: DashMap<(String, K), Slot<E>>,
}

impl<K, E> Default for EditorMap<K, E>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K, E> EditorMap<K, E>
where
    K: Eq + Hash + Clone,
{
    /// Install `editor` unless one is already held for this key, returning
    /// whichever ends up in the map.
    pub fn insert(&self, session: &str, scope: K, editor: E) -> SharedEditor<E> {
        let mut slot = self
            .entries
            .entry((session.to_string(), scope))
            .or_insert_with(|| Slot::new(Arc::new(Mutex::new(editor))));
        slot.touched = Instant::now();
        slot.editor.clone()
    }

    /// Look up without creating. Settling a late response uses this so that a
    /// discarded editor is never resurrected.
    pub fn get(&self, session: &str, scope: &K) -> Option<SharedEditor<E>> {
        self.entries
            .get_mut(&(session.to_string(), scope.clone()))
            .map(|mut slot| {
                slot.touched = Instant::now();
                slot.editor.clone()
            })
    }

    pub fn drop_session(&self, session: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(owner, _), _| owner != session);
        before - self.entries.len()
    }

    /// Remove entries last touched before `cutoff`.
    pub fn sweep_untouched_since(&self, cutoff: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, slot| slot.touched >= cutoff);
        before - self.entries.len()
    }

    /// Remove entries idle for longer than `ttl`.
    pub fn sweep_idle(&self, ttl: Duration) -> usize {
        match Instant::now().checked_sub(ttl) {
            Some(cutoff) => self.sweep_untouched_since(cutoff),
            None => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsightKind {
    HotTopics,
    Research,
}

impl InsightKind {
    pub fn slug(self) -> &'static str {
        match self {
            InsightKind::HotTopics => "hot-topics",
            InsightKind::Research => "research",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            InsightKind::HotTopics => "Hot topics",
            InsightKind::Research => "Research",
        }
    }
}

pub type InsightEditor = CollectionEditor<Insight, ArticleDraft>;
pub type EventEditor = CollectionEditor<Event, EventDraft>;
pub type PlanEditor = CollectionEditor<MembershipPlan, PlanDraft>;

/// All editor state for every signed-in admin.
#[derive(Default)]
pub struct AdminWorkspaces {
    pub topics: EditorMap<&'static TopicHub, TopicEditor>,
    pub insights: EditorMap<InsightKind, InsightEditor>,
    pub events: EditorMap<(), EventEditor>,
    pub plans: EditorMap<(), PlanEditor>,
}

impl AdminWorkspaces {
    /// Forget everything held for a session, e.g. on logout.
    pub fn drop_session(&self, session: &str) -> usize {
        self.topics.drop_session(session)
            + self.insights.drop_session(session)
            + self.events.drop_session(session)
            + self.plans.drop_session(session)
    }

    /// Forget editors nobody has used for `ttl`. Late responses for a swept
    /// editor are ignored.
    pub fn sweep_idle(&self, ttl: Duration) -> usize {
        self.topics.sweep_idle(ttl)
            + self.insights.sweep_idle(ttl)
            + self.events.sweep_idle(ttl)
            + self.plans.sweep_idle(ttl)
    }

    pub fn len(&self) -> usize {
        self.topics.len() + self.insights.len() + self.events.len() + self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::thread::sleep;

    use super::*;
    use crate::domain::topics::find_hub;

    #[tokio::test]
    async fn editors_are_isolated_per_session_and_scope() {
        let workspaces = AdminWorkspaces::default();
        let hub = find_hub("seminars").expect("registered");

        let first = workspaces.topics.insert("s1", hub, TopicEditor::new(hub));
        let again = workspaces.topics.insert("s1", hub, TopicEditor::new(hub));
        assert!(Arc::ptr_eq(&first, &again));

        let other = workspaces.topics.insert("s2", hub, TopicEditor::new(hub));
        assert!(!Arc::ptr_eq(&first, &other));

        workspaces
            .events
            .insert("s1", (), EventEditor::new(EventDraft::default()));
        assert_eq!(workspaces.len(), 3);
        assert_eq!(workspaces.drop_session("s1"), 2);
        assert!(workspaces.topics.get("s1", &hub).is_none());
        assert!(workspaces.topics.get("s2", &hub).is_some());
    }

    #[test]
    fn idle_editors_are_swept_and_touched_ones_kept() {
        let workspaces = AdminWorkspaces::default();
        let hub = find_hub("seminars").expect("registered");
        workspaces.topics.insert("idle", hub, TopicEditor::new(hub));
        workspaces.topics.insert("busy", hub, TopicEditor::new(hub));
        workspaces
            .plans
            .insert("idle", (), PlanEditor::new(PlanDraft::default()));

        sleep(Duration::from_millis(5));
        let cutoff = Instant::now();
        sleep(Duration::from_millis(5));
        assert!(workspaces.topics.get("busy", &hub).is_some());

        assert_eq!(workspaces.topics.sweep_untouched_since(cutoff), 1);
        assert_eq!(workspaces.plans.sweep_untouched_since(cutoff), 1);
        assert!(workspaces.topics.get("idle", &hub).is_none());
        assert!(workspaces.topics.get("busy", &hub).is_some());
    }

    #[test]
    fn sweep_with_a_long_ttl_keeps_fresh_editors() {
        let workspaces = AdminWorkspaces::default();
        workspaces
            .insights
            .insert("s1", InsightKind::Research, InsightEditor::new(ArticleDraft::default()));
        assert_eq!(workspaces.sweep_idle(Duration::from_secs(3600)), 0);
        assert_eq!(workspaces.len(), 1);

        sleep(Duration::from_millis(5));
        assert_eq!(workspaces.sweep_idle(Duration::from_millis(1)), 1);
        assert!(workspaces.is_empty());
    }
}
