//! Form fields shared by the topic hubs and the insight collections.

use civitas_api_types::ContentKind;

use super::forms::EditorFields;
use crate::domain::forms::ArticleDraft;
use crate::presentation::admin::views::FieldView;

pub(super) fn read_article(fields: &EditorFields) -> ArticleDraft {
    ArticleDraft {
        kind: fields.choice("kind"),
        title: fields.text("title"),
        subtitle: fields.text("subtitle"),
        author: fields.text("author"),
        date: fields.text("date"),
        image_url: fields.text("image_url"),
        excerpt: fields.text("excerpt"),
        body: fields.text("body"),
        sort_order: fields.text("sort_order"),
        is_published: fields.flag("is_published"),
    }
}

pub(super) fn article_fields(article: &ArticleDraft) -> Vec<FieldView> {
    vec![
        FieldView::select(
            "kind",
            "Type",
            ContentKind::ALL.iter().map(|kind| (kind.as_str(), kind.as_str())),
            article.kind.map(ContentKind::as_str),
        ),
        FieldView::text("title", "Title", &article.title),
        FieldView::text("subtitle", "Subtitle", &article.subtitle),
        FieldView::text("author", "Author", &article.author),
        FieldView::text("date", "Date", &article.date).with_hint("Shown as written, e.g. 12 March 2025."),
        FieldView::url("image_url", "Image URL", &article.image_url)
            .with_hint("Paste a link or upload an image below."),
        FieldView::textarea("excerpt", "Excerpt", &article.excerpt),
        FieldView::textarea("body", "Body", &article.body)
            .with_hint("Blank lines separate paragraphs."),
        FieldView::number("sort_order", "Sort order", &article.sort_order),
        FieldView::checkbox("is_published", "Published", article.is_published),
    ]
}

pub(super) fn article_meta(kind: ContentKind, date: &str, sort_order: i32) -> String {
    let mut parts = vec![kind.as_str().to_string()];
    if !date.trim().is_empty() {
        parts.push(date.trim().to_string());
    }
    parts.push(format!("order {sort_order}"));
    parts.join(" · ")
}
