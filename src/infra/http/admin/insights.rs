//! Hot topics and research: two flat article collections.

use std::collections::HashMap;
use std::sync::Arc;

use civitas_api_types::Insight;

use super::{
    AdminState,
    articles::{article_fields, article_meta, read_article},
    collections::{AdminCollection, PUBLISH_WORDS, PanelContext, PanelParts, panel_view, row_view},
    forms::EditorFields,
};
use crate::{
    application::{
        backend::CollectionApi,
        editor::CollectionEditor,
        workspaces::{AdminWorkspaces, EditorMap, InsightEditor, InsightKind},
    },
    domain::forms::ArticleDraft,
    presentation::admin::views::CollectionPanelView,
};

/// Editor for one insight kind; the kind comes from the route, not the path.
pub(super) struct InsightsPage<const RESEARCH: bool>;

pub(super) type HotTopicsPage = InsightsPage<false>;
pub(super) type ResearchPage = InsightsPage<true>;

impl<const RESEARCH: bool> InsightsPage<RESEARCH> {
    const KIND: InsightKind = if RESEARCH {
        InsightKind::Research
    } else {
        InsightKind::HotTopics
    };
}

impl<const RESEARCH: bool> AdminCollection for InsightsPage<RESEARCH> {
    type Record = Insight;
    type Draft = ArticleDraft;
    type Editor = InsightEditor;
    type Scope = InsightKind;

    fn scope(_: &HashMap<String, String>) -> Option<InsightKind> {
        Some(Self::KIND)
    }

    fn path(kind: &InsightKind) -> String {
        format!("/{}", kind.slug())
    }

    fn title(kind: &InsightKind) -> String {
        kind.title().to_string()
    }

    fn editors(workspaces: &AdminWorkspaces) -> &EditorMap<InsightKind, InsightEditor> {
        &workspaces.insights
    }

    fn new_editor(_: &InsightKind) -> InsightEditor {
        InsightEditor::new(ArticleDraft::blank())
    }

    fn api(state: &AdminState, kind: &InsightKind) -> Arc<dyn CollectionApi<Insight>> {
        match kind {
            InsightKind::HotTopics => state.collections.hot_topics(),
            InsightKind::Research => state.collections.research(),
        }
    }

    fn collection(editor: &InsightEditor) -> &CollectionEditor<Insight, ArticleDraft> {
        editor
    }

    fn collection_mut(editor: &mut InsightEditor) -> &mut CollectionEditor<Insight, ArticleDraft> {
        editor
    }

    fn apply_form(editor: &mut InsightEditor, fields: &EditorFields) {
        editor.update_draft(read_article(fields));
    }

    fn panel(editor: &InsightEditor, ctx: &PanelContext) -> CollectionPanelView {
        let rows = editor
            .sorted_records()
            .iter()
            .map(|insight| {
                row_view(
                    insight,
                    editor,
                    ctx,
                    &PUBLISH_WORDS,
                    article_meta(insight.kind, &insight.date, insight.sort_order),
                    Some(insight.image_url.clone()),
                )
            })
            .collect();
        let draft = editor.draft();
        panel_view(
            editor,
            ctx,
            PanelParts {
                heading: Self::KIND.title().to_string(),
                entity: "entry",
                tabs: Vec::new(),
                rows,
                fields: article_fields(draft),
                image_preview: Some(draft.image_url.clone()),
                gallery: Vec::new(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use civitas_api_types::ContentKind;

    use super::*;

    fn insight(id: &str, sort_order: i32) -> Insight {
        Insight {
            id: id.to_string(),
            kind: ContentKind::ResearchPaper,
            title: format!("Paper {id}"),
            subtitle: None,
            author: "Research desk".to_string(),
            date: "2024".to_string(),
            image_url: String::new(),
            excerpt: String::new(),
            body: String::new(),
            sort_order,
            is_published: true,
        }
    }

    #[test]
    fn kinds_map_to_their_own_pages() {
        assert_eq!(HotTopicsPage::path(&HotTopicsPage::KIND), "/hot-topics");
        assert_eq!(ResearchPage::path(&ResearchPage::KIND), "/research");
    }

    #[test]
    fn panel_rows_follow_display_order() {
        let mut editor = ResearchPage::new_editor(&InsightKind::Research);
        editor
            .load(Ok(vec![insight("late", 4), insight("early", 1)]))
            .expect("load");
        let ctx = PanelContext {
            base: "/admin/research".to_string(),
            accept: String::new(),
            max_upload_mb: 5,
        };
        let panel = ResearchPage::panel(&editor, &ctx);
        assert_eq!(panel.heading, "Research");
        assert_eq!(panel.rows[0].id, "early");
        assert_eq!(panel.rows[0].meta, "Research paper · 2024 · order 1");
        assert_eq!(panel.rows[0].thumbnail, None);
        assert!(!panel.has_tabs());
    }
}
