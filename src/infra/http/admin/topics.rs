//! Topic hub editors: one collection per hub, split into section tabs.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    response::Response,
    Extension,
};
use axum_extra::extract::Multipart;
use civitas_api_types::{ContentItem, Section};

use super::{
    AdminState,
    articles::{article_fields, article_meta, read_article},
    collections::{
        AdminCollection, PUBLISH_WORDS, PanelContext, PanelParts, PathParams,
        form_error_message, held_editor, panel_response, panel_view, row_view, scope_of, unknown_scope,
    },
    forms::{EditorFields, read_editor_form},
    shared::{Toast, toast_response},
};
use crate::{
    application::{
        backend::CollectionApi,
        editor::{CollectionEditor, TopicEditor},
        session::AdminSession,
        workspaces::{AdminWorkspaces, EditorMap},
    },
    domain::{
        forms::ContentDraft,
        topics::{TopicHub, find_hub},
    },
    presentation::admin::views::{CollectionPanelView, FieldView, TabView},
};

pub(super) struct TopicsPage;

impl AdminCollection for TopicsPage {
    type Record = ContentItem;
    type Draft = ContentDraft;
    type Editor = TopicEditor;
    type Scope = &'static TopicHub;

    fn scope(params: &HashMap<String, String>) -> Option<Self::Scope> {
        params.get("page").and_then(|slug| find_hub(slug))
    }

    fn path(hub: &Self::Scope) -> String {
        format!("/topics/{}", hub.slug)
    }

    fn title(hub: &Self::Scope) -> String {
        hub.title.to_string()
    }

    fn editors(workspaces: &AdminWorkspaces) -> &EditorMap<Self::Scope, Self::Editor> {
        &workspaces.topics
    }

    fn new_editor(hub: &Self::Scope) -> Self::Editor {
        TopicEditor::new(hub)
    }

    fn api(state: &AdminState, hub: &Self::Scope) -> Arc<dyn CollectionApi<ContentItem>> {
        state.collections.topic(hub.slug)
    }

    fn collection(editor: &TopicEditor) -> &CollectionEditor<ContentItem, ContentDraft> {
        editor.collection()
    }

    fn collection_mut(editor: &mut TopicEditor) -> &mut CollectionEditor<ContentItem, ContentDraft> {
        editor.collection_mut()
    }

    fn apply_form(editor: &mut TopicEditor, fields: &EditorFields) {
        editor.update_draft(ContentDraft {
            page: editor.hub().slug.to_string(),
            section: fields.choice("section"),
            article: read_article(fields),
        });
    }

    fn panel(editor: &TopicEditor, ctx: &PanelContext) -> CollectionPanelView {
        let collection = editor.collection();
        let tabs = Section::ALL
            .into_iter()
            .map(|section| TabView {
                label: section.label().to_string(),
                count: editor.count(section),
                is_active: editor.tab() == section,
                action: ctx.action(&format!("/tab/{}", section.as_str())),
            })
            .collect();
        let rows = editor
            .tab_items()
            .iter()
            .map(|item| {
                row_view(
                    item,
                    collection,
                    ctx,
                    &PUBLISH_WORDS,
                    article_meta(item.kind, &item.date, item.sort_order),
                    Some(item.image_url.clone()),
                )
            })
            .collect();

        let draft = collection.draft();
        let mut fields = vec![FieldView::select(
            "section",
            "Section",
            Section::ALL
                .iter()
                .map(|section| (section.as_str(), section.label())),
            draft.section.map(Section::as_str),
        )];
        fields.extend(article_fields(&draft.article));

        panel_view(
            collection,
            ctx,
            PanelParts {
                heading: editor.hub().title.to_string(),
                entity: "item",
                tabs,
                rows,
                fields,
                image_preview: Some(draft.article.image_url.clone()),
                gallery: Vec::new(),
            },
        )
    }
}

/// Switch the visible section, keeping whatever was typed into the form.
pub(super) async fn switch_tab(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    params: PathParams,
    mut multipart: Multipart,
) -> Response {
    let Some((hub, params)) = scope_of::<TopicsPage>(params) else {
        return unknown_scope();
    };
    let Some(section) = params.get("section").and_then(|raw| raw.parse::<Section>().ok()) else {
        return unknown_scope();
    };
    let form = match read_editor_form(&mut multipart).await {
        Ok(form) => form,
        Err(err) => return toast_response(Toast::error(form_error_message(&state, err))),
    };

    let editor = match held_editor::<TopicsPage>(&state, &session, &hub).await {
        Ok(editor) => editor,
        Err(response) => return response,
    };
    let mut guard = editor.lock().await;
    if !form.fields.is_empty() {
        TopicsPage::apply_form(&mut guard, &form.fields);
    }
    guard.switch_tab(section);
    panel_response::<TopicsPage>(&state, &hub, &guard)
}
