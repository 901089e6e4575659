//! Public request intake: callback and membership forms.
//!
//! A submission moves `Idle -> Submitting -> Succeeded`, or back to `Idle`
//! with an error banner. Validation failures never leave `Idle` and never
//! touch the network.

use std::sync::Arc;

use metrics::counter;
use tracing::{info, warn};

use crate::application::backend::{BackendError, PublicApi};
use crate::domain::contact::{CallbackForm, MembershipForm};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeState {
    Idle { error: Option<String> },
    Submitting,
    Succeeded,
}

impl Default for IntakeState {
    fn default() -> Self {
        Self::Idle { error: None }
    }
}

/// One form's fields plus where its submission stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intake<F> {
    pub fields: F,
    pub state: IntakeState,
}

impl<F: Default> Intake<F> {
    pub fn new(fields: F) -> Self {
        Self {
            fields,
            state: IntakeState::default(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            IntakeState::Idle { error } => error.as_deref(),
            _ => None,
        }
    }

    /// Validate and enter `Submitting`. A rejected form stays `Idle`.
    fn begin<S>(
        &mut self,
        validate: impl FnOnce(&F) -> Result<S, DomainError>,
    ) -> Option<S> {
        if self.state == IntakeState::Submitting {
            return None;
        }
        match validate(&self.fields) {
            Ok(submission) => {
                self.state = IntakeState::Submitting;
                Some(submission)
            }
            Err(err) => {
                self.state = IntakeState::Idle {
                    error: Some(err.banner()),
                };
                None
            }
        }
    }

    /// Success clears the fields; failure keeps them for correction.
    fn finish(&mut self, form: &'static str, outcome: Result<(), BackendError>) {
        match outcome {
            Ok(()) => {
                counter!("civitas_intake_submissions_total", "form" => form, "outcome" => "ok")
                    .increment(1);
                info!(target = "civitas::application::intake", form, "request submitted");
                self.fields = F::default();
                self.state = IntakeState::Succeeded;
            }
            Err(err) => {
                counter!("civitas_intake_submissions_total", "form" => form, "outcome" => "error")
                    .increment(1);
                warn!(
                    target = "civitas::application::intake",
                    form,
                    error = %err,
                    "request submission failed"
                );
                self.state = IntakeState::Idle {
                    error: Some(err.user_message()),
                };
            }
        }
    }
}

#[derive(Clone)]
pub struct IntakeService {
    api: Arc<dyn PublicApi>,
}

impl IntakeService {
    pub fn new(api: Arc<dyn PublicApi>) -> Self {
        Self { api }
    }

    pub async fn submit_callback(&self, mut intake: Intake<CallbackForm>) -> Intake<CallbackForm> {
        if let Some(submission) = intake.begin(CallbackForm::validate) {
            let outcome = self.api.submit_callback(&submission).await;
            intake.finish("callback", outcome);
        }
        intake
    }

    pub async fn submit_membership(
        &self,
        mut intake: Intake<MembershipForm>,
    ) -> Intake<MembershipForm> {
        if let Some(submission) = intake.begin(MembershipForm::validate) {
            let outcome = self.api.submit_membership(&submission).await;
            intake.finish("membership", outcome);
        }
        intake
    }
}
