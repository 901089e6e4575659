//! Server-held admin editors.
//!
//! [`CollectionEditor`] pairs an [`OptimisticList`] with the draft being
//! edited. Every backend round trip is split into a `begin`/`prepare` step
//! taken under the editor lock and a `finish` step taken after the response
//! arrives, so no lock is held while the request is in flight.

use civitas_api_types::{ContentItem, Section, UploadedImage};
use thiserror::Error;
use tracing::warn;

use crate::application::backend::BackendError;
use crate::application::optimistic::{OptimisticError, OptimisticList, Pending};
use crate::domain::error::DomainError;
use crate::domain::forms::{ContentDraft, Draft};
use crate::domain::records::{Record, sort_for_display};
use crate::domain::topics::TopicHub;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error(transparent)]
    Optimistic(#[from] OptimisticError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("A save is already in progress.")]
    Saving,
}

impl EditorError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(err) => err.banner(),
            Self::Backend(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Error(String),
    Info(String),
}

impl Banner {
    pub fn message(&self) -> &str {
        match self {
            Banner::Error(message) | Banner::Info(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Banner::Error(_))
    }
}

/// A validated save waiting for the backend.
#[derive(Debug, Clone)]
pub struct Submission<P> {
    /// `None` creates, `Some` replaces the record with this id.
    pub id: Option<String>,
    pub payload: P,
}

#[derive(Debug, Clone)]
pub struct CollectionEditor<R: Record, D: Draft<R>> {
    list: OptimisticList<R>,
    draft: D,
    blank: D,
    editing: Option<String>,
    banner: Option<Banner>,
    saving: bool,
    loaded: bool,
}

impl<R: Record, D: Draft<R>> CollectionEditor<R, D> {
    pub fn new(blank: D) -> Self {
        Self {
            list: OptimisticList::default(),
            draft: blank.clone(),
            blank,
            editing: None,
            banner: None,
            saving: false,
            loaded: false,
        }
    }

    pub fn records(&self) -> &[R] {
        self.list.items()
    }

    /// Records in display order.
    pub fn sorted_records(&self) -> Vec<R> {
        let mut records = self.list.items().to_vec();
        sort_for_display(&mut records);
        records
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.list.is_pending(id)
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    fn fail(&mut self, err: EditorError) -> EditorError {
        self.banner = Some(Banner::Error(err.user_message()));
        err
    }

    /// Install a freshly fetched listing.
    pub fn load(&mut self, outcome: Result<Vec<R>, BackendError>) -> Result<(), EditorError> {
        match outcome {
            Ok(records) => {
                self.list.reset(records);
                self.loaded = true;
                if self.banner.as_ref().is_some_and(Banner::is_error) {
                    self.banner = None;
                }
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Replace the blank template used after a save or cancel.
    pub fn set_blank(&mut self, blank: D) {
        self.blank = blank;
    }

    /// Overwrite the draft with what the form currently holds.
    pub fn update_draft(&mut self, draft: D) {
        self.draft = draft;
    }

    pub fn draft_mut(&mut self) -> &mut D {
        &mut self.draft
    }

    pub fn start_edit(&mut self, id: &str) -> Result<(), EditorError> {
        let Some(record) = self.list.get(id) else {
            return Err(self.fail(DomainError::not_found(R::ENTITY).into()));
        };
        self.draft = D::from_record(record);
        self.editing = Some(id.to_string());
        self.banner = None;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.editing = None;
        self.draft = self.blank.clone();
        self.banner = None;
    }

    pub fn attach_image(&mut self, image: &UploadedImage) {
        self.draft.attach_image(image);
    }

    /// Validate the draft and mark the editor as saving.
    ///
    /// Saving an existing record holds its id until [`Self::finish_submit`],
    /// so a toggle or delete of that record cannot race the save.
    pub fn prepare_submit(&mut self) -> Result<Submission<R::Payload>, EditorError> {
        if self.saving {
            return Err(self.fail(EditorError::Saving));
        }
        let payload = self.draft.validate().map_err(|err| self.fail(err.into()))?;
        let held = match self.editing.as_deref() {
            Some(id) => self.list.hold(id),
            None => Ok(()),
        };
        if let Err(err) = held {
            return Err(self.fail(err.into()));
        }
        self.saving = true;
        self.banner = None;
        Ok(Submission {
            id: self.editing.clone(),
            payload,
        })
    }

    pub fn finish_submit(
        &mut self,
        submission: Submission<R::Payload>,
        outcome: Result<R, BackendError>,
    ) -> Result<(), EditorError> {
        self.saving = false;
        if let Some(id) = submission.id.as_deref() {
            self.list.release(id);
        }
        let record = outcome.map_err(|err| self.fail(err.into()))?;

        let message = match submission.id {
            Some(id) => {
                if !self.list.replace(record) {
                    warn!(
                        target = "civitas::application::editor",
                        entity = R::ENTITY,
                        %id,
                        "updated record is no longer listed"
                    );
                }
                if self.editing.as_deref() == Some(id.as_str()) {
                    self.editing = None;
                    self.draft = self.blank.clone();
                }
                "Changes saved."
            }
            None => {
                self.list.prepend(record);
                if self.editing.is_none() {
                    self.draft = self.blank.clone();
                }
                "Created."
            }
        };
        self.banner = Some(Banner::Info(message.to_string()));
        Ok(())
    }

    /// Flip the visibility flag locally. Returns the new value to send.
    pub fn begin_toggle(&mut self, id: &str) -> Result<(Pending<R>, bool), EditorError> {
        let mut target = false;
        let pending = self
            .list
            .begin_update(id, |record| {
                target = !record.is_visible();
                record.set_visible(target);
            })
            .map_err(|err| self.fail(err.into()))?;
        self.banner = None;
        Ok((pending, target))
    }

    pub fn finish_toggle(
        &mut self,
        pending: Pending<R>,
        outcome: Result<R, BackendError>,
    ) -> Result<(), EditorError> {
        self.list
            .settle(pending, outcome.map(Some))
            .map_err(|err| self.fail(err.into()))
    }

    pub fn begin_delete(&mut self, id: &str) -> Result<Pending<R>, EditorError> {
        let pending = self
            .list
            .begin_remove(id)
            .map_err(|err| self.fail(err.into()))?;
        self.banner = None;
        Ok(pending)
    }

    pub fn finish_delete(
        &mut self,
        pending: Pending<R>,
        outcome: Result<(), BackendError>,
    ) -> Result<(), EditorError> {
        let id = pending.id().to_string();
        self.list
            .settle(pending, outcome.map(|()| None))
            .map_err(|err| self.fail(err.into()))?;
        if self.editing.as_deref() == Some(id.as_str()) {
            self.editing = None;
            self.draft = self.blank.clone();
        }
        Ok(())
    }
}

/// Editor for one topic hub, organised into section tabs.
#[derive(Debug, Clone)]
pub struct TopicEditor {
    hub: &'static TopicHub,
    tab: Section,
    collection: CollectionEditor<ContentItem, ContentDraft>,
}

impl TopicEditor {
    pub fn new(hub: &'static TopicHub) -> Self {
        let tab = Section::default();
        Self {
            hub,
            tab,
            collection: CollectionEditor::new(ContentDraft::blank(hub.slug, tab)),
        }
    }

    pub fn hub(&self) -> &'static TopicHub {
        self.hub
    }

    pub fn tab(&self) -> Section {
        self.tab
    }

    pub fn collection(&self) -> &CollectionEditor<ContentItem, ContentDraft> {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut CollectionEditor<ContentItem, ContentDraft> {
        &mut self.collection
    }

    /// Switching tabs keeps the draft. The draft's section follows the tab
    /// only while no existing item is being edited.
    pub fn switch_tab(&mut self, section: Section) {
        self.tab = section;
        self.collection
            .set_blank(ContentDraft::blank(self.hub.slug, section));
        if self.collection.editing().is_none() {
            self.collection.draft_mut().section = Some(section);
        }
    }

    /// Accept a posted draft. The page is always this hub's.
    pub fn update_draft(&mut self, mut draft: ContentDraft) {
        draft.page = self.hub.slug.to_string();
        self.collection.update_draft(draft);
    }

    /// Items of the active tab, in display order.
    pub fn tab_items(&self) -> Vec<ContentItem> {
        self.section_items(self.tab)
    }

    pub fn section_items(&self, section: Section) -> Vec<ContentItem> {
        let mut items: Vec<ContentItem> = self
            .collection
            .records()
            .iter()
            .filter(|item| item.section == section)
            .cloned()
            .collect();
        sort_for_display(&mut items);
        items
    }

    pub fn count(&self, section: Section) -> usize {
        self.collection
            .records()
            .iter()
            .filter(|item| item.section == section)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use civitas_api_types::ContentPayload;

    use super::*;
    use crate::domain::records::fixtures::post;
    use crate::domain::topics::find_hub;

    fn seminars() -> TopicEditor {
        let mut editor = TopicEditor::new(find_hub("seminars").expect("registered"));
        editor
            .collection_mut()
            .load(Ok(vec![
                post("a", Section::Featured, 0, true),
                post("b", Section::Latest, 1, false),
                post("c", Section::Latest, 0, true),
            ]))
            .expect("load");
        editor
    }

    fn created(payload: &ContentPayload, id: &str) -> ContentItem {
        ContentItem {
            id: id.into(),
            page: payload.page.clone(),
            section: payload.section,
            kind: payload.kind,
            title: payload.title.clone(),
            subtitle: payload.subtitle.clone(),
            author: payload.author.clone(),
            date: payload.date.clone(),
            image_url: payload.image_url.clone(),
            excerpt: payload.excerpt.clone(),
            body: payload.body.clone(),
            sort_order: payload.sort_order,
            is_published: payload.is_published,
            created_at: None,
        }
    }

    fn fill(editor: &mut TopicEditor) {
        let mut draft = editor.collection().draft().clone();
        draft.article.title = "Transition finance".into();
        draft.article.author = "Desk".into();
        draft.article.date = "June 2024".into();
        draft.article.image_url = "https://img.example/t.jpg".into();
        draft.article.excerpt = "Excerpt".into();
        draft.article.body = "Body".into();
        draft.page = "someone-else".into();
        editor.update_draft(draft);
    }

    #[test]
    fn tabs_group_and_sort_items() {
        let editor = seminars();
        let latest: Vec<String> = editor
            .section_items(Section::Latest)
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(latest, vec!["c", "b"]);
        assert_eq!(editor.count(Section::Archive), 0);
    }

    #[test]
    fn create_uses_active_tab_and_resets_to_it() {
        let mut editor = seminars();
        editor.switch_tab(Section::Archive);
        fill(&mut editor);

        let submission = editor.collection_mut().prepare_submit().expect("valid");
        assert_eq!(submission.id, None);
        assert_eq!(submission.payload.section, Section::Archive);
        assert_eq!(submission.payload.page, "seminars");
        assert!(editor.collection().is_saving());

        let item = created(&submission.payload, "new");
        editor
            .collection_mut()
            .finish_submit(submission, Ok(item))
            .expect("saved");
        assert_eq!(editor.collection().records()[0].id, "new");
        assert_eq!(editor.collection().draft(), &ContentDraft::blank("seminars", Section::Archive));
        assert_eq!(editor.count(Section::Archive), 1);
    }

    #[test]
    fn invalid_draft_sets_single_banner_without_saving() {
        let mut editor = seminars();
        let err = editor.collection_mut().prepare_submit().unwrap_err();
        assert!(matches!(err, EditorError::Invalid(_)));
        assert!(!editor.collection().is_saving());
        let banner = editor.collection().banner().expect("banner");
        assert!(banner.is_error());
        assert!(banner.message().starts_with("Please fill in: title, author"));
    }

    #[test]
    fn switching_tabs_while_editing_keeps_the_section() {
        let mut editor = seminars();
        editor.collection_mut().start_edit("a").expect("edit");
        editor.switch_tab(Section::Archive);
        assert_eq!(editor.collection().draft().section, Some(Section::Featured));
        assert_eq!(editor.collection().draft().article.title, "Post a");

        editor.collection_mut().cancel();
        assert_eq!(editor.collection().draft().section, Some(Section::Archive));
        assert!(editor.collection().draft().article.title.is_empty());
    }

    #[test]
    fn switching_tabs_keeps_an_unsaved_new_draft() {
        let mut editor = seminars();
        fill(&mut editor);
        editor.switch_tab(Section::Latest);
        let draft = editor.collection().draft();
        assert_eq!(draft.section, Some(Section::Latest));
        assert_eq!(draft.article.title, "Transition finance");
    }

    #[test]
    fn update_replaces_with_server_copy() {
        let mut editor = seminars();
        editor.collection_mut().start_edit("b").expect("edit");
        let submission = editor.collection_mut().prepare_submit().expect("valid");
        assert_eq!(submission.id.as_deref(), Some("b"));

        let mut server = post("b", Section::Latest, 1, false);
        server.title = "Server title".into();
        editor
            .collection_mut()
            .finish_submit(submission, Ok(server))
            .expect("saved");
        assert_eq!(editor.collection().editing(), None);
        let titles: Vec<String> = editor
            .section_items(Section::Latest)
            .into_iter()
            .map(|item| item.title)
            .collect();
        assert!(titles.contains(&"Server title".to_string()));
    }

    #[test]
    fn failed_save_keeps_the_draft() {
        let mut editor = seminars();
        fill(&mut editor);
        let submission = editor.collection_mut().prepare_submit().expect("valid");
        let err = editor
            .collection_mut()
            .finish_submit(submission, Err(BackendError::from_status(500, b"")))
            .unwrap_err();
        assert_eq!(err.user_message(), "Request failed (500)");
        assert_eq!(editor.collection().draft().article.title, "Transition finance");
        assert!(!editor.collection().is_saving());
    }

    #[test]
    fn failed_toggle_restores_previous_state() {
        let mut editor = seminars();
        let (pending, target) = editor.collection_mut().begin_toggle("b").expect("begin");
        assert!(target);
        assert!(editor.section_items(Section::Latest)[1].is_published);

        editor
            .collection_mut()
            .finish_toggle(pending, Err(BackendError::Timeout))
            .unwrap_err();
        let b = editor
            .section_items(Section::Latest)
            .into_iter()
            .find(|item| item.id == "b")
            .expect("b");
        assert!(!b.is_published);
        assert!(editor.collection().banner().is_some_and(Banner::is_error));
    }

    #[test]
    fn save_is_refused_while_a_toggle_is_pending() {
        let mut editor = seminars();
        let (pending, _) = editor.collection_mut().begin_toggle("a").expect("begin");
        editor.collection_mut().start_edit("a").expect("edit");
        editor.collection_mut().draft_mut().article.title = "Renamed".into();

        let err = editor.collection_mut().prepare_submit().unwrap_err();
        assert_eq!(err, EditorError::Optimistic(OptimisticError::Busy { entity: "post" }));
        assert!(!editor.collection().is_saving());
        assert_eq!(editor.collection().draft().article.title, "Renamed");

        editor
            .collection_mut()
            .finish_toggle(pending, Err(BackendError::from_status(500, b"")))
            .unwrap_err();
        let submission = editor.collection_mut().prepare_submit().expect("toggle settled");
        assert_eq!(submission.id.as_deref(), Some("a"));
    }

    #[test]
    fn failed_toggle_cannot_overwrite_a_confirmed_save() {
        let mut editor = seminars();
        editor.collection_mut().start_edit("a").expect("edit");
        editor.collection_mut().draft_mut().article.title = "Renamed".into();
        let submission = editor.collection_mut().prepare_submit().expect("valid");

        let err = editor.collection_mut().begin_toggle("a").unwrap_err();
        assert_eq!(err, EditorError::Optimistic(OptimisticError::Busy { entity: "post" }));

        let mut server = post("a", Section::Featured, 0, true);
        server.title = "Renamed".into();
        editor
            .collection_mut()
            .finish_submit(submission, Ok(server))
            .expect("saved");
        let a = editor.section_items(Section::Featured).remove(0);
        assert_eq!(a.title, "Renamed");
        assert!(!editor.collection().is_pending("a"));
    }

    #[test]
    fn delete_is_refused_while_saving_and_allowed_after_a_failed_save() {
        let mut editor = seminars();
        editor.collection_mut().start_edit("c").expect("edit");
        let submission = editor.collection_mut().prepare_submit().expect("valid");

        let err = editor.collection_mut().begin_delete("c").unwrap_err();
        assert_eq!(err, EditorError::Optimistic(OptimisticError::Busy { entity: "post" }));
        assert_eq!(editor.count(Section::Latest), 2);

        editor
            .collection_mut()
            .finish_submit(submission, Err(BackendError::Timeout))
            .unwrap_err();
        let pending = editor.collection_mut().begin_delete("c").expect("released");
        editor
            .collection_mut()
            .finish_delete(pending, Ok(()))
            .expect("deleted");
        assert_eq!(editor.count(Section::Latest), 1);
    }

    #[test]
    fn deleting_the_edited_item_clears_the_form() {
        let mut editor = seminars();
        editor.collection_mut().start_edit("c").expect("edit");
        let pending = editor.collection_mut().begin_delete("c").expect("begin");
        editor
            .collection_mut()
            .finish_delete(pending, Ok(()))
            .expect("deleted");
        assert_eq!(editor.collection().editing(), None);
        assert_eq!(editor.count(Section::Latest), 1);
    }
}
