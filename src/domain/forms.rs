//! In-progress editor drafts and their validation.
//!
//! Drafts hold exactly what the admin typed. `validate` turns a draft into the
//! full-replace payload the backend expects, or a single combined message
//! naming every missing field.

use civitas_api_types::{
    Billing, ContentItem, ContentKind, ContentPayload, Event, EventPayload, Insight,
    InsightPayload, MembershipPlan, PlanImage, PlanPayload, Section, UploadedImage,
};

use crate::domain::error::DomainError;
use crate::domain::records::Record;

pub trait Draft<R: Record>: Clone + Default + Send + Sync + 'static {
    fn from_record(record: &R) -> Self;
    fn validate(&self) -> Result<R::Payload, DomainError>;
    /// Record a freshly uploaded image on the draft.
    fn attach_image(&mut self, image: &UploadedImage);
}

/// Collects blank required fields so they can be reported together.
#[derive(Default)]
struct Missing(Vec<&'static str>);

impl Missing {
    fn text(&mut self, label: &'static str, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.0.push(label);
        }
        trimmed.to_string()
    }

    fn choice<T: Copy>(&mut self, label: &'static str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.0.push(label);
        }
        value
    }

    fn finish(self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "Please fill in: {}.",
                self.0.join(", ")
            )))
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Blank means zero; anything else must be a whole number.
pub fn parse_sort_order(raw: &str) -> Result<i32, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<i32>()
        .map_err(|_| DomainError::validation("Sort order must be a whole number."))
}

/// Fields shared by topic posts, hot topics and research pieces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleDraft {
    pub kind: Option<ContentKind>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub image_url: String,
    pub excerpt: String,
    pub body: String,
    pub sort_order: String,
    pub is_published: bool,
}

struct ValidArticle {
    kind: ContentKind,
    title: String,
    subtitle: Option<String>,
    author: String,
    date: String,
    image_url: String,
    excerpt: String,
    body: String,
    sort_order: i32,
}

impl ArticleDraft {
    pub fn blank() -> Self {
        Self {
            kind: Some(ContentKind::default()),
            ..Self::default()
        }
    }

    fn check(&self, missing: &mut Missing) -> (Option<ContentKind>, [String; 6]) {
        let kind = missing.choice("type", self.kind);
        let fields = [
            missing.text("title", &self.title),
            missing.text("author", &self.author),
            missing.text("date", &self.date),
            missing.text("image", &self.image_url),
            missing.text("excerpt", &self.excerpt),
            // Body newlines are significant, so only the emptiness check trims.
            if self.body.trim().is_empty() {
                missing.0.push("body");
                String::new()
            } else {
                self.body.clone()
            },
        ];
        (kind, fields)
    }

    fn finish(
        &self,
        missing: Missing,
        kind: Option<ContentKind>,
        fields: [String; 6],
    ) -> Result<ValidArticle, DomainError> {
        missing.finish()?;
        let sort_order = parse_sort_order(&self.sort_order)?;
        let [title, author, date, image_url, excerpt, body] = fields;
        Ok(ValidArticle {
            kind: kind.unwrap_or_default(),
            title,
            subtitle: optional(&self.subtitle),
            author,
            date,
            image_url,
            excerpt,
            body,
            sort_order,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn from_parts(
        kind: ContentKind,
        title: &str,
        subtitle: Option<&str>,
        author: &str,
        date: &str,
        image_url: &str,
        excerpt: &str,
        body: &str,
        sort_order: i32,
        is_published: bool,
    ) -> Self {
        Self {
            kind: Some(kind),
            title: title.to_string(),
            subtitle: subtitle.unwrap_or_default().to_string(),
            author: author.to_string(),
            date: date.to_string(),
            image_url: image_url.to_string(),
            excerpt: excerpt.to_string(),
            body: body.to_string(),
            sort_order: sort_order.to_string(),
            is_published,
        }
    }
}

/// Draft of a topic post. `page` is fixed by the editor the draft belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDraft {
    pub page: String,
    pub section: Option<Section>,
    pub article: ArticleDraft,
}

impl ContentDraft {
    pub fn blank(page: &str, section: Section) -> Self {
        Self {
            page: page.to_string(),
            section: Some(section),
            article: ArticleDraft::blank(),
        }
    }
}

impl Draft<ContentItem> for ContentDraft {
    fn from_record(item: &ContentItem) -> Self {
        Self {
            page: item.page.clone(),
            section: Some(item.section),
            article: ArticleDraft::from_parts(
                item.kind,
                &item.title,
                item.subtitle.as_deref(),
                &item.author,
                &item.date,
                &item.image_url,
                &item.excerpt,
                &item.body,
                item.sort_order,
                item.is_published,
            ),
        }
    }

    fn validate(&self) -> Result<ContentPayload, DomainError> {
        let mut missing = Missing::default();
        let section = missing.choice("section", self.section);
        let (kind, fields) = self.article.check(&mut missing);
        let valid = self.article.finish(missing, kind, fields)?;

        Ok(ContentPayload {
            page: self.page.clone(),
            section: section.unwrap_or_default(),
            kind: valid.kind,
            title: valid.title,
            subtitle: valid.subtitle,
            author: valid.author,
            date: valid.date,
            image_url: valid.image_url,
            excerpt: valid.excerpt,
            body: valid.body,
            sort_order: valid.sort_order,
            is_published: self.article.is_published,
        })
    }

    fn attach_image(&mut self, image: &UploadedImage) {
        self.article.image_url = image.secure_url.clone();
    }
}

impl Draft<Insight> for ArticleDraft {
    fn from_record(item: &Insight) -> Self {
        Self::from_parts(
            item.kind,
            &item.title,
            item.subtitle.as_deref(),
            &item.author,
            &item.date,
            &item.image_url,
            &item.excerpt,
            &item.body,
            item.sort_order,
            item.is_published,
        )
    }

    fn validate(&self) -> Result<InsightPayload, DomainError> {
        let mut missing = Missing::default();
        let (kind, fields) = self.check(&mut missing);
        let valid = self.finish(missing, kind, fields)?;

        Ok(InsightPayload {
            kind: valid.kind,
            title: valid.title,
            subtitle: valid.subtitle,
            author: valid.author,
            date: valid.date,
            image_url: valid.image_url,
            excerpt: valid.excerpt,
            body: valid.body,
            sort_order: valid.sort_order,
            is_published: self.is_published,
        })
    }

    fn attach_image(&mut self, image: &UploadedImage) {
        self.image_url = image.secure_url.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub date: String,
    pub location: String,
    pub summary: String,
    pub image_url: String,
    pub registration_url: String,
    pub sort_order: String,
    pub is_published: bool,
}

impl Draft<Event> for EventDraft {
    fn from_record(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            date: event.date.clone(),
            location: event.location.clone(),
            summary: event.summary.clone(),
            image_url: event.image_url.clone(),
            registration_url: event.registration_url.clone().unwrap_or_default(),
            sort_order: event.sort_order.to_string(),
            is_published: event.is_published,
        }
    }

    fn validate(&self) -> Result<EventPayload, DomainError> {
        let mut missing = Missing::default();
        let title = missing.text("title", &self.title);
        let date = missing.text("date", &self.date);
        let location = missing.text("location", &self.location);
        let summary = missing.text("summary", &self.summary);
        missing.finish()?;

        let registration_url = optional(&self.registration_url);
        if let Some(url) = registration_url.as_deref()
            && url::Url::parse(url).is_err()
        {
            return Err(DomainError::validation(
                "Registration link must be an absolute URL.",
            ));
        }

        Ok(EventPayload {
            title,
            date,
            location,
            summary,
            image_url: self.image_url.trim().to_string(),
            registration_url,
            sort_order: parse_sort_order(&self.sort_order)?,
            is_published: self.is_published,
        })
    }

    fn attach_image(&mut self, image: &UploadedImage) {
        self.image_url = image.secure_url.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanDraft {
    pub subject: String,
    pub plan: String,
    pub title: String,
    pub short: String,
    pub intro: String,
    pub price: String,
    pub billing: Option<Billing>,
    /// One feature per line.
    pub features: String,
    pub images: Vec<PlanImage>,
    pub is_active: bool,
    pub sort_order: String,
}

impl PlanDraft {
    pub fn remove_image(&mut self, public_id: &str) {
        self.images.retain(|image| image.public_id != public_id);
    }

    /// Promote an image to cover position.
    pub fn make_cover(&mut self, public_id: &str) {
        if let Some(index) = self
            .images
            .iter()
            .position(|image| image.public_id == public_id)
        {
            let image = self.images.remove(index);
            self.images.insert(0, image);
        }
    }
}

impl Draft<MembershipPlan> for PlanDraft {
    fn from_record(plan: &MembershipPlan) -> Self {
        Self {
            subject: plan.subject.clone(),
            plan: plan.plan.clone(),
            title: plan.title.clone(),
            short: plan.short.clone(),
            intro: plan.intro.clone(),
            price: plan.price.to_string(),
            billing: Some(plan.billing),
            features: plan.features.join("\n"),
            images: plan.images.clone(),
            is_active: plan.is_active,
            sort_order: plan.sort_order.to_string(),
        }
    }

    fn validate(&self) -> Result<PlanPayload, DomainError> {
        let mut missing = Missing::default();
        let plan = missing.text("plan", &self.plan);
        let title = missing.text("title", &self.title);
        let price_raw = missing.text("price", &self.price);
        let billing = missing.choice("billing", self.billing);
        missing.finish()?;

        let price = price_raw
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite() && *price >= 0.0)
            .ok_or_else(|| DomainError::validation("Price must be a non-negative number."))?;

        Ok(PlanPayload {
            subject: self.subject.trim().to_string(),
            plan,
            title,
            short: self.short.trim().to_string(),
            intro: self.intro.trim().to_string(),
            price,
            billing: billing.unwrap_or_default(),
            features: self
                .features
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            images: self.images.clone(),
            is_active: self.is_active,
            sort_order: parse_sort_order(&self.sort_order)?,
        })
    }

    fn attach_image(&mut self, image: &UploadedImage) {
        if self
            .images
            .iter()
            .any(|existing| existing.public_id == image.public_id)
        {
            return;
        }
        self.images.push(PlanImage {
            secure_url: image.secure_url.clone(),
            public_id: image.public_id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::fixtures::post;

    fn filled_article() -> ArticleDraft {
        ArticleDraft {
            kind: Some(ContentKind::Report),
            title: " Grid storage ".into(),
            subtitle: "  ".into(),
            author: "R. Ames".into(),
            date: "March 2024".into(),
            image_url: "https://img.example/a.jpg".into(),
            excerpt: "Short".into(),
            body: "Line one\nLine two\n".into(),
            sort_order: "3".into(),
            is_published: true,
        }
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let draft = ContentDraft {
            page: "seminars".into(),
            section: None,
            article: ArticleDraft {
                title: "   ".into(),
                ..filled_article()
            },
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(err.banner(), "Please fill in: section, title.");
    }

    #[test]
    fn valid_post_trims_text_but_keeps_body() {
        let draft = ContentDraft {
            page: "seminars".into(),
            section: Some(Section::Latest),
            article: filled_article(),
        };
        let payload = draft.validate().expect("valid");
        assert_eq!(payload.title, "Grid storage");
        assert_eq!(payload.subtitle, None);
        assert_eq!(payload.body, "Line one\nLine two\n");
        assert_eq!(payload.sort_order, 3);
        assert_eq!(payload.section, Section::Latest);
    }

    #[test]
    fn sort_order_must_be_numeric() {
        assert_eq!(parse_sort_order(" ").unwrap(), 0);
        assert_eq!(parse_sort_order("-4").unwrap(), -4);
        let draft = ArticleDraft {
            sort_order: "first".into(),
            ..filled_article()
        };
        let err = Draft::<Insight>::validate(&draft).unwrap_err();
        assert_eq!(err.banner(), "Sort order must be a whole number.");
    }

    #[test]
    fn draft_round_trips_a_record() {
        let item = post("p1", Section::Archive, 7, false);
        let draft = ContentDraft::from_record(&item);
        let payload = draft.validate().expect("existing record is valid");
        assert_eq!(payload, ContentPayload::from(&item));
    }

    #[test]
    fn blank_draft_uses_the_active_tab() {
        let draft = ContentDraft::blank("seminars", Section::Archive);
        assert_eq!(draft.section, Some(Section::Archive));
        assert!(!draft.article.is_published);
    }

    #[test]
    fn event_requires_core_fields_and_absolute_link() {
        let mut draft = EventDraft {
            title: "Annual forum".into(),
            date: "12 June".into(),
            ..EventDraft::default()
        };
        assert_eq!(
            draft.validate().unwrap_err().banner(),
            "Please fill in: location, summary."
        );
        draft.location = "Nairobi".into();
        draft.summary = "Two days".into();
        draft.registration_url = "register-here".into();
        assert!(draft.validate().is_err());
        draft.registration_url = "https://forum.example/register".into();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn plan_features_and_images() {
        let mut draft = PlanDraft {
            plan: "Corporate".into(),
            title: "Corporate membership".into(),
            price: "1200".into(),
            billing: Some(Billing::Year),
            features: "Briefings\n\n  Roundtables \n".into(),
            ..PlanDraft::default()
        };
        for id in ["a", "b"] {
            draft.attach_image(&UploadedImage {
                secure_url: format!("https://img.example/{id}.png"),
                public_id: id.into(),
            });
        }
        draft.make_cover("b");
        let payload = draft.validate().expect("valid plan");
        assert_eq!(payload.features, vec!["Briefings", "Roundtables"]);
        assert_eq!(payload.images[0].public_id, "b");

        draft.price = "-1".into();
        assert!(draft.validate().is_err());
    }
}
