//! Validation for the public callback and membership request forms.
//!
//! Both forms need one way to reach the requester: an email, a phone
//! number, or both. Failures produce a single message for the form banner.

use civitas_api_types::{CallbackSubmission, MembershipSubmission};
use serde::Deserialize;

use crate::domain::countries::canonical_country;
use crate::domain::error::DomainError;

const PHONE_MIN_LEN: usize = 7;

/// Subjects offered by the callback form.
pub const CALLBACK_SUBJECTS: [&str; 5] = [
    "Membership",
    "Research collaboration",
    "Events and seminars",
    "Media enquiry",
    "Other",
];

/// Accepts a simple `local@domain.tld` shape.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// At least seven characters drawn from digits, spaces and `+ - ( )`.
pub fn is_valid_phone(value: &str) -> bool {
    value.chars().count() >= PHONE_MIN_LEN
        && value
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, ' ' | '+' | '-' | '(' | ')'))
}

fn present(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Shared "email or phone" rule. Returns the trimmed channels on success.
pub fn validate_contact_channel(
    email: &str,
    phone: &str,
) -> Result<(Option<String>, Option<String>), DomainError> {
    let email = present(email);
    let phone = present(phone);

    if email.is_none() && phone.is_none() {
        return Err(DomainError::validation(
            "Please provide an email address or a phone number.",
        ));
    }
    if let Some(email) = email.as_deref()
        && !is_valid_email(email)
    {
        return Err(DomainError::validation(
            "Please enter a valid email address.",
        ));
    }
    if let Some(phone) = phone.as_deref()
        && !is_valid_phone(phone)
    {
        return Err(DomainError::validation(
            "Please enter a valid phone number (at least 7 digits).",
        ));
    }

    Ok((email, phone))
}

/// Raw callback form fields as typed by the visitor.
///
/// `country_query` is the picker's search text; only `country` (set when a list
/// entry is chosen) satisfies the country requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CallbackForm {
    pub subject: String,
    pub reason: String,
    pub country_query: String,
    pub country: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl CallbackForm {
    /// The picker text changed; any previously chosen country no longer applies.
    pub fn type_country(&mut self, query: &str) {
        self.country_query = query.to_string();
        self.country.clear();
    }

    pub fn choose_country(&mut self, name: &str) -> Result<(), DomainError> {
        let country = canonical_country(name)
            .ok_or_else(|| DomainError::validation("Please choose a country from the list."))?;
        self.country = country.to_string();
        self.country_query = country.to_string();
        Ok(())
    }

    pub fn validate(&self) -> Result<CallbackSubmission, DomainError> {
        let subject = present(&self.subject)
            .ok_or_else(|| DomainError::validation("Please choose a subject."))?;
        let reason = present(&self.reason)
            .ok_or_else(|| DomainError::validation("Please tell us the reason for your call."))?;
        let country = canonical_country(&self.country)
            .ok_or_else(|| DomainError::validation("Please choose a country from the list."))?;
        let (email, phone) = validate_contact_channel(&self.email, &self.phone)?;

        Ok(CallbackSubmission {
            subject,
            reason,
            country: country.to_string(),
            email,
            phone,
            message: present(&self.message),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MembershipForm {
    pub full_name: String,
    pub organization: String,
    pub email: String,
    pub phone: String,
    pub plan: String,
    pub message: String,
}

impl MembershipForm {
    pub fn validate(&self) -> Result<MembershipSubmission, DomainError> {
        let full_name = present(&self.full_name)
            .ok_or_else(|| DomainError::validation("Please enter your full name."))?;
        let plan = present(&self.plan)
            .ok_or_else(|| DomainError::validation("Please choose a membership plan."))?;
        let (email, phone) = validate_contact_channel(&self.email, &self.phone)?;

        Ok(MembershipSubmission {
            full_name,
            organization: present(&self.organization),
            email,
            phone,
            plan,
            message: present(&self.message),
        })
    }
}
