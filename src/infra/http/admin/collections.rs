//! Handlers shared by every collection editor.
//!
//! Each editor (a topic hub, hot topics, research, events, membership plans)
//! implements [`AdminCollection`]; the handlers below are instantiated once per
//! implementation in the router. Mutations follow the optimistic pattern: the
//! change is applied under the editor lock and patched to the page at once,
//! the backend call runs with no lock held, and the settled state is patched
//! when it answers.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::Multipart;
use tracing::{debug, warn};

use crate::{
    application::{
        backend::CollectionApi,
        editor::CollectionEditor,
        error::HttpError,
        session::AdminSession,
        stream::LiveStream,
        uploads::ProgressFn,
        workspaces::{AdminWorkspaces, EditorMap, SharedEditor},
    },
    domain::{forms::Draft, records::Record},
    presentation::{
        admin::views::{
            AdminChrome, AdminCollectionPanelTemplate, AdminCollectionTemplate,
            AdminUploadProgressTemplate, BannerView, CollectionPanelView, FieldView, ImageThumbView,
            RowView,
            TabView,
        },
        views::{render_fragment, render_template_response},
    },
};

use super::{
    AdminState,
    forms::{EditorFields, FormError, read_editor_form},
    selectors::{COLLECTION_PANEL, UPLOAD_PROGRESS},
    shared::{Toast, datastar_replace, live_patch, live_toast, toast_response},
};

const SOURCE: &str = "infra::http::admin::collections";

pub(super) type PathParams = Option<Path<HashMap<String, String>>>;

/// What a panel needs to know about where it is mounted.
pub(super) struct PanelContext {
    /// Absolute href of the editor page; actions hang off it.
    pub base: String,
    pub accept: String,
    pub max_upload_mb: u64,
}

impl PanelContext {
    fn new(state: &AdminState, path: &str) -> Self {
        let policy = state.uploads.policy();
        Self {
            base: state.href(path),
            accept: policy.allowed_types().join(","),
            max_upload_mb: policy.max_bytes().div_ceil(1024 * 1024),
        }
    }

    pub fn action(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.base)
    }
}

pub(super) trait AdminCollection: Send + Sync + 'static {
    type Record: Record;
    type Draft: Draft<Self::Record>;
    type Editor: Send + 'static;
    type Scope: Eq + Hash + Clone + Send + Sync + 'static;

    fn scope(params: &HashMap<String, String>) -> Option<Self::Scope>;
    /// Editor page path relative to the admin base.
    fn path(scope: &Self::Scope) -> String;
    fn title(scope: &Self::Scope) -> String;
    fn editors(workspaces: &AdminWorkspaces) -> &EditorMap<Self::Scope, Self::Editor>;
    fn new_editor(scope: &Self::Scope) -> Self::Editor;
    fn api(state: &AdminState, scope: &Self::Scope) -> Arc<dyn CollectionApi<Self::Record>>;
    fn collection(editor: &Self::Editor) -> &CollectionEditor<Self::Record, Self::Draft>;
    fn collection_mut(
        editor: &mut Self::Editor,
    ) -> &mut CollectionEditor<Self::Record, Self::Draft>;
    /// Copy posted form fields onto the draft.
    fn apply_form(editor: &mut Self::Editor, fields: &EditorFields);
    fn panel(editor: &Self::Editor, ctx: &PanelContext) -> CollectionPanelView;
}

/// Visibility wording for a collection's rows.
pub(super) struct VisibilityWords {
    pub on: &'static str,
    pub off: &'static str,
    pub show: &'static str,
    pub hide: &'static str,
}

pub(super) const PUBLISH_WORDS: VisibilityWords = VisibilityWords {
    on: "Published",
    off: "Draft",
    show: "Publish",
    hide: "Unpublish",
};

pub(super) fn row_view<R: Record, D: Draft<R>>(
    record: &R,
    collection: &CollectionEditor<R, D>,
    ctx: &PanelContext,
    words: &VisibilityWords,
    meta: String,
    thumbnail: Option<String>,
) -> RowView {
    let id = record.id();
    let visible = record.is_visible();
    RowView {
        id: id.to_string(),
        title: record.label().to_string(),
        meta,
        thumbnail: thumbnail.filter(|url| !url.trim().is_empty()),
        visible,
        visible_label: if visible { words.on } else { words.off },
        toggle_label: if visible { words.hide } else { words.show },
        pending: collection.is_pending(id),
        is_editing: collection.editing() == Some(id),
        edit_action: ctx.action(&format!("/items/{id}/edit")),
        toggle_action: ctx.action(&format!("/items/{id}/visibility")),
        delete_action: ctx.action(&format!("/items/{id}/delete")),
    }
}

/// Panel fields shared by every editor; callers fill in the collection specifics.
pub(super) struct PanelParts {
    pub heading: String,
    pub entity: &'static str,
    pub tabs: Vec<TabView>,
    pub rows: Vec<RowView>,
    pub fields: Vec<FieldView>,
    pub image_preview: Option<String>,
    pub gallery: Vec<ImageThumbView>,
}

pub(super) fn panel_view<R: Record, D: Draft<R>>(
    collection: &CollectionEditor<R, D>,
    ctx: &PanelContext,
    parts: PanelParts,
) -> CollectionPanelView {
    let is_editing = collection.editing().is_some();
    CollectionPanelView {
        empty_message: format!("No {} entries yet.", parts.entity),
        form_title: if is_editing {
            format!("Edit {}", parts.entity)
        } else {
            format!("New {}", parts.entity)
        },
        submit_label: if is_editing { "Save changes" } else { "Create" },
        is_editing,
        is_saving: collection.is_saving(),
        is_loaded: collection.is_loaded(),
        banner: collection.banner().map(|banner| BannerView {
            message: banner.message().to_string(),
            is_error: banner.is_error(),
        }),
        image_preview: parts.image_preview.filter(|url| !url.trim().is_empty()),
        has_gallery: !parts.gallery.is_empty(),
        gallery: parts.gallery,
        heading: parts.heading,
        entity: parts.entity.to_string(),
        base: ctx.base.clone(),
        tabs: parts.tabs,
        rows: parts.rows,
        fields: parts.fields,
        accept: ctx.accept.clone(),
        max_upload_mb: ctx.max_upload_mb,
    }
}

pub(super) fn scope_of<C: AdminCollection>(
    params: PathParams,
) -> Option<(C::Scope, HashMap<String, String>)> {
    let params = params.map(|Path(params)| params).unwrap_or_default();
    C::scope(&params).map(|scope| (scope, params))
}

pub(super) fn unknown_scope() -> Response {
    HttpError::new(
        SOURCE,
        StatusCode::NOT_FOUND,
        "Unknown editor",
        "no editor is registered for this path",
    )
    .into_response()
}

/// The session's editor for `scope`, fetching the listing on first use.
///
/// A new editor is installed only once its listing loads. When the backend
/// refuses (an expired or forged token, an outage) the detached editor comes
/// back as `Err`, carrying the error banner, and nothing is kept.
async fn editor_for<C: AdminCollection>(
    state: &AdminState,
    session: &AdminSession,
    scope: &C::Scope,
) -> Result<SharedEditor<C::Editor>, Box<C::Editor>> {
    let key = session.token.session_key();
    let editors = C::editors(&state.workspaces);
    if let Some(editor) = editors.get(&key, scope) {
        return Ok(editor);
    }

    let mut editor = C::new_editor(scope);
    let outcome = C::api(state, scope).list(&session.token).await;
    match C::collection_mut(&mut editor).load(outcome) {
        Ok(()) => Ok(editors.insert(&key, scope.clone(), editor)),
        Err(err) => {
            warn!(
                target = "civitas::http::admin::collections",
                path = %C::path(scope),
                error = %err,
                "collection listing failed; editor not kept"
            );
            Err(Box::new(editor))
        }
    }
}

/// [`editor_for`] for fragment handlers: a detached editor becomes the panel
/// response showing why it could not load.
pub(super) async fn held_editor<C: AdminCollection>(
    state: &AdminState,
    session: &AdminSession,
    scope: &C::Scope,
) -> Result<SharedEditor<C::Editor>, Response> {
    editor_for::<C>(state, session, scope)
        .await
        .map_err(|detached| panel_response::<C>(state, scope, &detached))
}

async fn reload<C: AdminCollection>(
    state: &AdminState,
    session: &AdminSession,
    scope: &C::Scope,
    editor: &SharedEditor<C::Editor>,
) {
    let outcome = C::api(state, scope).list(&session.token).await;
    let mut guard = editor.lock().await;
    if let Err(err) = C::collection_mut(&mut guard).load(outcome) {
        warn!(
            target = "civitas::http::admin::collections",
            path = %C::path(scope),
            error = %err,
            "collection reload failed"
        );
    }
}

fn render_panel<C: AdminCollection>(
    state: &AdminState,
    scope: &C::Scope,
    editor: &C::Editor,
) -> AdminCollectionPanelTemplate {
    let ctx = PanelContext::new(state, &C::path(scope));
    AdminCollectionPanelTemplate {
        panel: C::panel(editor, &ctx),
    }
}

pub(super) fn panel_response<C: AdminCollection>(
    state: &AdminState,
    scope: &C::Scope,
    editor: &C::Editor,
) -> Response {
    match render_fragment(render_panel::<C>(state, scope, editor), SOURCE) {
        Ok(html) => datastar_replace(COLLECTION_PANEL, html).into_response(),
        Err(err) => err.into_response(),
    }
}

fn live_panel<C: AdminCollection>(
    live: &LiveStream,
    state: &AdminState,
    scope: &C::Scope,
    editor: &C::Editor,
) {
    live_patch(live, render_panel::<C>(state, scope, editor), COLLECTION_PANEL);
}

pub(super) async fn page<C: AdminCollection>(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    params: PathParams,
) -> Response {
    let Some((scope, _)) = scope_of::<C>(params) else {
        return unknown_scope();
    };
    let path = C::path(&scope);
    let title = C::title(&scope);
    let ctx = PanelContext::new(&state, &path);
    let chrome = AdminChrome::new(&state.base_path, &path, &title, session.email.as_deref());
    let panel = match editor_for::<C>(&state, &session, &scope).await {
        Ok(editor) => C::panel(&*editor.lock().await, &ctx),
        Err(detached) => C::panel(&detached, &ctx),
    };
    render_template_response(AdminCollectionTemplate { chrome, panel }, StatusCode::OK)
}

pub(super) async fn refresh<C: AdminCollection>(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    params: PathParams,
) -> Response {
    let Some((scope, _)) = scope_of::<C>(params) else {
        return unknown_scope();
    };
    let key = session.token.session_key();
    let editor = match C::editors(&state.workspaces).get(&key, &scope) {
        Some(editor) => {
            reload::<C>(&state, &session, &scope, &editor).await;
            editor
        }
        None => match held_editor::<C>(&state, &session, &scope).await {
            Ok(editor) => editor,
            Err(response) => return response,
        },
    };
    let guard = editor.lock().await;
    panel_response::<C>(&state, &scope, &guard)
}

pub(super) async fn edit<C: AdminCollection>(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    params: PathParams,
) -> Response {
    let Some((scope, params)) = scope_of::<C>(params) else {
        return unknown_scope();
    };
    let id = params.get("id").cloned().unwrap_or_default();
    let editor = match held_editor::<C>(&state, &session, &scope).await {
        Ok(editor) => editor,
        Err(response) => return response,
    };
    let mut guard = editor.lock().await;
    if let Err(err) = C::collection_mut(&mut guard).start_edit(&id) {
        debug!(
            target = "civitas::http::admin::collections",
            path = %C::path(&scope),
            %id,
            error = %err,
            "edit refused"
        );
    }
    panel_response::<C>(&state, &scope, &guard)
}

pub(super) async fn cancel<C: AdminCollection>(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    params: PathParams,
) -> Response {
    let Some((scope, _)) = scope_of::<C>(params) else {
        return unknown_scope();
    };
    let editor = match held_editor::<C>(&state, &session, &scope).await {
        Ok(editor) => editor,
        Err(response) => return response,
    };
    let mut guard = editor.lock().await;
    C::collection_mut(&mut guard).cancel();
    panel_response::<C>(&state, &scope, &guard)
}

pub(super) async fn save<C: AdminCollection>(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    params: PathParams,
    mut multipart: Multipart,
) -> Response {
    let Some((scope, _)) = scope_of::<C>(params) else {
        return unknown_scope();
    };
    let form = match read_editor_form(&mut multipart).await {
        Ok(form) => form,
        Err(err) => return toast_response(Toast::error(form_error_message(&state, err))),
    };
    let editor = match held_editor::<C>(&state, &session, &scope).await {
        Ok(editor) => editor,
        Err(response) => return response,
    };
    let (live, response) = LiveStream::open();

    let prepared = {
        let mut guard = editor.lock().await;
        if !form.fields.is_empty() {
            C::apply_form(&mut guard, &form.fields);
        }
        let prepared = C::collection_mut(&mut guard).prepare_submit();
        live_panel::<C>(&live, &state, &scope, &guard);
        prepared
    };
    let Ok(submission) = prepared else {
        return response;
    };

    tokio::spawn(async move {
        let api = C::api(&state, &scope);
        let outcome = match submission.id.as_deref() {
            Some(id) => api.update(&session.token, id, &submission.payload).await,
            None => api.create(&session.token, &submission.payload).await,
        };
        let Some(editor) = C::editors(&state.workspaces).get(&session.token.session_key(), &scope)
        else {
            return;
        };
        let mut guard = editor.lock().await;
        let settled = C::collection_mut(&mut guard).finish_submit(submission, outcome);
        live_panel::<C>(&live, &state, &scope, &guard);
        match settled {
            Ok(()) => live_toast(&live, Toast::success("Saved.")),
            Err(err) => live_toast(&live, Toast::error(err.user_message())),
        }
    });
    response
}

pub(super) async fn toggle_visibility<C: AdminCollection>(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    params: PathParams,
) -> Response {
    let Some((scope, params)) = scope_of::<C>(params) else {
        return unknown_scope();
    };
    let id = params.get("id").cloned().unwrap_or_default();
    let editor = match held_editor::<C>(&state, &session, &scope).await {
        Ok(editor) => editor,
        Err(response) => return response,
    };
    let (live, response) = LiveStream::open();

    let begun = {
        let mut guard = editor.lock().await;
        let begun = C::collection_mut(&mut guard).begin_toggle(&id);
        live_panel::<C>(&live, &state, &scope, &guard);
        begun
    };
    let (pending, visible) = match begun {
        Ok(begun) => begun,
        Err(err) => {
            live_toast(&live, Toast::error(err.user_message()));
            return response;
        }
    };

    tokio::spawn(async move {
        let outcome = C::api(&state, &scope)
            .set_visibility(&session.token, &id, visible)
            .await;
        let Some(editor) = C::editors(&state.workspaces).get(&session.token.session_key(), &scope)
        else {
            return;
        };
        let mut guard = editor.lock().await;
        let settled = C::collection_mut(&mut guard).finish_toggle(pending, outcome);
        live_panel::<C>(&live, &state, &scope, &guard);
        if let Err(err) = settled {
            live_toast(&live, Toast::error(err.user_message()));
        }
    });
    response
}

pub(super) async fn delete<C: AdminCollection>(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    params: PathParams,
) -> Response {
    let Some((scope, params)) = scope_of::<C>(params) else {
        return unknown_scope();
    };
    let id = params.get("id").cloned().unwrap_or_default();
    let editor = match held_editor::<C>(&state, &session, &scope).await {
        Ok(editor) => editor,
        Err(response) => return response,
    };
    let (live, response) = LiveStream::open();

    let begun = {
        let mut guard = editor.lock().await;
        let begun = C::collection_mut(&mut guard).begin_delete(&id);
        live_panel::<C>(&live, &state, &scope, &guard);
        begun
    };
    let pending = match begun {
        Ok(pending) => pending,
        Err(err) => {
            live_toast(&live, Toast::error(err.user_message()));
            return response;
        }
    };

    tokio::spawn(async move {
        let outcome = C::api(&state, &scope).delete(&session.token, &id).await;
        let Some(editor) = C::editors(&state.workspaces).get(&session.token.session_key(), &scope)
        else {
            return;
        };
        let mut guard = editor.lock().await;
        let settled = C::collection_mut(&mut guard).finish_delete(pending, outcome);
        live_panel::<C>(&live, &state, &scope, &guard);
        match settled {
            Ok(()) => live_toast(&live, Toast::success("Deleted.")),
            Err(err) => live_toast(&live, Toast::error(err.user_message())),
        }
    });
    response
}

/// Upload the picked image and attach it to the draft.
///
/// The policy is checked before anything leaves the server, so a rejected
/// file never reaches the signing endpoint.
pub(super) async fn upload_image<C: AdminCollection>(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    params: PathParams,
    mut multipart: Multipart,
) -> Response {
    let Some((scope, _)) = scope_of::<C>(params) else {
        return unknown_scope();
    };
    let form = match read_editor_form(&mut multipart).await {
        Ok(form) => form,
        Err(err) => return toast_response(Toast::error(form_error_message(&state, err))),
    };
    let editor = match held_editor::<C>(&state, &session, &scope).await {
        Ok(editor) => editor,
        Err(response) => return response,
    };
    if !form.fields.is_empty() {
        let mut guard = editor.lock().await;
        C::apply_form(&mut guard, &form.fields);
    }

    let Some(file) = form.image else {
        return toast_response(Toast::error("Choose an image to upload."));
    };
    if let Err(rejection) = state.uploads.policy().check(&file.content_type, file.size()) {
        return toast_response(Toast::error(rejection.to_string()));
    }

    let (live, response) = LiveStream::open();
    let progress = progress_reporter(live.clone());
    tokio::spawn(async move {
        let uploaded = state
            .uploads
            .attach_image(
                &session.token,
                &file,
                state.media_folder.as_deref(),
                progress,
            )
            .await;
        let Some(editor) = C::editors(&state.workspaces).get(&session.token.session_key(), &scope)
        else {
            return;
        };
        let mut guard = editor.lock().await;
        match uploaded {
            Ok(image) => {
                C::collection_mut(&mut guard).attach_image(&image);
                live_panel::<C>(&live, &state, &scope, &guard);
                live_toast(&live, Toast::success("Image uploaded."));
            }
            Err(err) => {
                live_panel::<C>(&live, &state, &scope, &guard);
                live_toast(&live, Toast::error(err.user_message()));
            }
        }
    });
    response
}

pub(super) fn form_error_message(state: &AdminState, err: FormError) -> String {
    match err {
        FormError::TooLarge => format!(
            "Image must be {} MB or smaller.",
            state.uploads.policy().max_bytes().div_ceil(1024 * 1024)
        ),
        other => other.to_string(),
    }
}

/// Patch the progress bar whenever the whole percentage moves.
fn progress_reporter(live: LiveStream) -> ProgressFn {
    let last = AtomicU8::new(u8::MAX);
    Arc::new(move |percent: u8| {
        if last.swap(percent, Ordering::Relaxed) == percent {
            return;
        }
        live_patch(
            &live,
            AdminUploadProgressTemplate {
                percent,
                label: format!("Uploading… {percent}%"),
            },
            UPLOAD_PROGRESS,
        );
    })
}
