//! Membership plans. Unlike the other collections a plan carries an ordered
//! image gallery; the first image is the cover.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Response,
    Extension,
};
use axum_extra::extract::Multipart;
use civitas_api_types::{Billing, MembershipPlan};
use serde::Deserialize;

use super::{
    AdminState,
    collections::{
        AdminCollection, PanelContext, PanelParts, PathParams, VisibilityWords,
        form_error_message, held_editor, panel_response, panel_view, row_view, scope_of, unknown_scope,
    },
    forms::{EditorFields, read_editor_form},
    shared::{Toast, toast_response},
};
use crate::{
    application::{
        backend::CollectionApi,
        editor::CollectionEditor,
        session::AdminSession,
        workspaces::{AdminWorkspaces, EditorMap, PlanEditor},
    },
    domain::forms::PlanDraft,
    presentation::admin::views::{CollectionPanelView, FieldView, ImageThumbView},
};

const ACTIVE_WORDS: VisibilityWords = VisibilityWords {
    on: "Active",
    off: "Inactive",
    show: "Activate",
    hide: "Deactivate",
};

pub(super) struct PlansPage;

impl AdminCollection for PlansPage {
    type Record = MembershipPlan;
    type Draft = PlanDraft;
    type Editor = PlanEditor;
    type Scope = ();

    fn scope(_: &HashMap<String, String>) -> Option<()> {
        Some(())
    }

    fn path(_: &()) -> String {
        "/plans".to_string()
    }

    fn title(_: &()) -> String {
        "Membership plans".to_string()
    }

    fn editors(workspaces: &AdminWorkspaces) -> &EditorMap<(), PlanEditor> {
        &workspaces.plans
    }

    fn new_editor(_: &()) -> PlanEditor {
        PlanEditor::new(PlanDraft {
            is_active: true,
            ..PlanDraft::default()
        })
    }

    fn api(state: &AdminState, _: &()) -> Arc<dyn CollectionApi<MembershipPlan>> {
        state.collections.plans()
    }

    fn collection(editor: &PlanEditor) -> &CollectionEditor<MembershipPlan, PlanDraft> {
        editor
    }

    fn collection_mut(editor: &mut PlanEditor) -> &mut CollectionEditor<MembershipPlan, PlanDraft> {
        editor
    }

    /// The gallery is not a form field; it stays as held on the server.
    fn apply_form(editor: &mut PlanEditor, fields: &EditorFields) {
        let images = editor.draft().images.clone();
        editor.update_draft(PlanDraft {
            subject: fields.text("subject"),
            plan: fields.text("plan"),
            title: fields.text("title"),
            short: fields.text("short"),
            intro: fields.text("intro"),
            price: fields.text("price"),
            billing: fields.choice("billing"),
            features: fields.text("features"),
            images,
            is_active: fields.flag("is_active"),
            sort_order: fields.text("sort_order"),
        });
    }

    fn panel(editor: &PlanEditor, ctx: &PanelContext) -> CollectionPanelView {
        let rows = editor
            .sorted_records()
            .iter()
            .map(|plan| {
                let mut meta = Vec::new();
                if !plan.subject.trim().is_empty() {
                    meta.push(plan.subject.trim().to_string());
                }
                meta.push(format!("{} {}", plan.price, plan.billing.price_suffix()));
                meta.push(format!("order {}", plan.sort_order));
                row_view(
                    plan,
                    editor,
                    ctx,
                    &ACTIVE_WORDS,
                    meta.join(" · "),
                    plan.images.first().map(|image| image.secure_url.clone()),
                )
            })
            .collect();

        let draft = editor.draft();
        let fields = vec![
            FieldView::text("subject", "Subject", &draft.subject)
                .with_hint("Groups plans on the membership page."),
            FieldView::text("plan", "Plan name", &draft.plan),
            FieldView::text("title", "Title", &draft.title),
            FieldView::text("short", "Short description", &draft.short),
            FieldView::textarea("intro", "Introduction", &draft.intro),
            FieldView::number("price", "Price", &draft.price),
            FieldView::select(
                "billing",
                "Billing",
                Billing::ALL
                    .iter()
                    .map(|billing| (billing.as_str(), billing.price_suffix())),
                draft.billing.map(Billing::as_str),
            ),
            FieldView::textarea("features", "Features", &draft.features)
                .with_hint("One feature per line."),
            FieldView::number("sort_order", "Sort order", &draft.sort_order),
            FieldView::checkbox("is_active", "Active", draft.is_active),
        ];
        let gallery = draft
            .images
            .iter()
            .enumerate()
            .map(|(index, image)| ImageThumbView {
                url: image.secure_url.clone(),
                public_id: image.public_id.clone(),
                is_cover: index == 0,
            })
            .collect();

        panel_view(
            editor,
            ctx,
            PanelParts {
                heading: "Membership plans".to_string(),
                entity: "plan",
                tabs: Vec::new(),
                rows,
                fields,
                image_preview: None,
                gallery,
            },
        )
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GalleryQuery {
    action: String,
    id: String,
}

/// Reorder or drop a gallery image on the draft. Nothing is sent to the
/// backend until the plan is saved.
pub(super) async fn gallery(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    params: PathParams,
    Query(query): Query<GalleryQuery>,
    mut multipart: Multipart,
) -> Response {
    let Some(((), _)) = scope_of::<PlansPage>(params) else {
        return unknown_scope();
    };
    let form = match read_editor_form(&mut multipart).await {
        Ok(form) => form,
        Err(err) => return toast_response(Toast::error(form_error_message(&state, err))),
    };

    let editor = match held_editor::<PlansPage>(&state, &session, &()).await {
        Ok(editor) => editor,
        Err(response) => return response,
    };
    let mut guard = editor.lock().await;
    if !form.fields.is_empty() {
        PlansPage::apply_form(&mut guard, &form.fields);
    }
    match query.action.as_str() {
        "cover" => guard.draft_mut().make_cover(&query.id),
        "remove" => guard.draft_mut().remove_image(&query.id),
        _ => return toast_response(Toast::error("Unknown gallery action.")),
    }
    panel_response::<PlansPage>(&state, &(), &guard)
}

#[cfg(test)]
mod tests {
    use civitas_api_types::PlanImage;

    use super::*;

    fn image(id: &str) -> PlanImage {
        PlanImage {
            secure_url: format!("https://media.example/{id}.jpg"),
            public_id: id.to_string(),
        }
    }

    #[test]
    fn form_updates_keep_the_gallery() {
        let mut editor = PlansPage::new_editor(&());
        editor.draft_mut().images = vec![image("a"), image("b")];
        PlansPage::apply_form(
            &mut editor,
            &EditorFields::from_pairs([("plan", "Fellow"), ("billing", "year")]),
        );
        let draft = editor.draft();
        assert_eq!(draft.plan, "Fellow");
        assert_eq!(draft.billing, Some(Billing::Year));
        assert_eq!(draft.images.len(), 2);
        assert!(!draft.is_active);
    }

    #[test]
    fn gallery_marks_the_first_image_as_cover() {
        let mut editor = PlansPage::new_editor(&());
        editor.draft_mut().images = vec![image("a"), image("b")];
        editor.draft_mut().make_cover("b");
        let ctx = PanelContext {
            base: "/admin/plans".to_string(),
            accept: String::new(),
            max_upload_mb: 5,
        };
        let panel = PlansPage::panel(&editor, &ctx);
        assert!(panel.has_gallery);
        assert_eq!(panel.gallery[0].public_id, "b");
        assert!(panel.gallery[0].is_cover);
        assert!(!panel.gallery[1].is_cover);
    }
}
