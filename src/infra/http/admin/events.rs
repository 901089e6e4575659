use std::collections::HashMap;
use std::sync::Arc;

use civitas_api_types::Event;

use super::{
    AdminState,
    collections::{AdminCollection, PUBLISH_WORDS, PanelContext, PanelParts, panel_view, row_view},
    forms::EditorFields,
};
use crate::{
    application::{
        backend::CollectionApi,
        editor::CollectionEditor,
        workspaces::{AdminWorkspaces, EditorMap, EventEditor},
    },
    domain::forms::EventDraft,
    presentation::admin::views::{CollectionPanelView, FieldView},
};

pub(super) struct EventsPage;

impl AdminCollection for EventsPage {
    type Record = Event;
    type Draft = EventDraft;
    type Editor = EventEditor;
    type Scope = ();

    fn scope(_: &HashMap<String, String>) -> Option<()> {
        Some(())
    }

    fn path(_: &()) -> String {
        "/events".to_string()
    }

    fn title(_: &()) -> String {
        "Events".to_string()
    }

    fn editors(workspaces: &AdminWorkspaces) -> &EditorMap<(), EventEditor> {
        &workspaces.events
    }

    fn new_editor(_: &()) -> EventEditor {
        EventEditor::new(EventDraft::default())
    }

    fn api(state: &AdminState, _: &()) -> Arc<dyn CollectionApi<Event>> {
        state.collections.events()
    }

    fn collection(editor: &EventEditor) -> &CollectionEditor<Event, EventDraft> {
        editor
    }

    fn collection_mut(editor: &mut EventEditor) -> &mut CollectionEditor<Event, EventDraft> {
        editor
    }

    fn apply_form(editor: &mut EventEditor, fields: &EditorFields) {
        editor.update_draft(EventDraft {
            title: fields.text("title"),
            date: fields.text("date"),
            location: fields.text("location"),
            summary: fields.text("summary"),
            image_url: fields.text("image_url"),
            registration_url: fields.text("registration_url"),
            sort_order: fields.text("sort_order"),
            is_published: fields.flag("is_published"),
        });
    }

    fn panel(editor: &EventEditor, ctx: &PanelContext) -> CollectionPanelView {
        let rows = editor
            .sorted_records()
            .iter()
            .map(|event| {
                let mut meta: Vec<String> = [&event.date, &event.location]
                    .into_iter()
                    .map(|part| part.trim())
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect();
                meta.push(format!("order {}", event.sort_order));
                row_view(
                    event,
                    editor,
                    ctx,
                    &PUBLISH_WORDS,
                    meta.join(" · "),
                    Some(event.image_url.clone()),
                )
            })
            .collect();

        let draft = editor.draft();
        let fields = vec![
            FieldView::text("title", "Title", &draft.title),
            FieldView::text("date", "Date", &draft.date).with_hint("Shown as written."),
            FieldView::text("location", "Location", &draft.location),
            FieldView::textarea("summary", "Summary", &draft.summary),
            FieldView::url("image_url", "Image URL", &draft.image_url),
            FieldView::url("registration_url", "Registration link", &draft.registration_url)
                .with_hint("Optional. Must start with http:// or https://."),
            FieldView::number("sort_order", "Sort order", &draft.sort_order),
            FieldView::checkbox("is_published", "Published", draft.is_published),
        ];

        panel_view(
            editor,
            ctx,
            PanelParts {
                heading: "Events".to_string(),
                entity: "event",
                tabs: Vec::new(),
                rows,
                fields,
                image_preview: Some(draft.image_url.clone()),
                gallery: Vec::new(),
            },
        )
    }
}
