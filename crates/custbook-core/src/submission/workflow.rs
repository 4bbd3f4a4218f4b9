use thiserror::Error;
use tracing::{debug, info, warn};

use super::form::{validate, Field, FieldErrors, FormState};
use crate::api::{ApiClient, ApiError, CREATE_FAILED_MESSAGE, CUSTOMERS_KEY};
use crate::cache::Revalidate;
use crate::models::Customer;

/// Lifecycle of the add-customer dialog.
///
/// `Idle`, `Editing` and `Submitting` are the resting phases; the others are
/// passed through while a submit attempt resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Editing,
    Validating,
    Submitting,
    SuccessClosing,
    Failed,
}

impl Phase {
    pub fn can_transition_to(&self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, Editing)
                | (Editing, Editing)
                | (Editing, Validating)
                | (Editing, Idle)
                | (Validating, Editing)
                | (Validating, Submitting)
                | (Submitting, SuccessClosing)
                | (Submitting, Failed)
                | (SuccessClosing, Idle)
                | (Failed, Editing)
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("The dialog is not open")]
    DialogClosed,

    #[error("A submission is already in flight")]
    SubmitInFlight,

    #[error("No submission is in flight")]
    NotSubmitting,

    #[error("Illegal transition from {from:?} to {to:?}")]
    IllegalTransition { from: Phase, to: Phase },
}

/// Result of the validation half of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStart {
    /// Validation failed; the dialog stays in `Editing`.
    Invalid(FieldErrors),
    /// Validation passed; send this payload, then call `finish_submit`.
    Ready(Customer),
    /// A submission is already in flight; nothing happened.
    AlreadySubmitting,
}

/// Final result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Invalid(FieldErrors),
    Created,
    Failed(String),
    Ignored,
}

/// State machine behind the add-customer dialog.
#[derive(Debug)]
pub struct SubmissionWorkflow {
    phase: Phase,
    form: FormState,
    field_errors: FieldErrors,
    submit_error: Option<String>,
}

impl Default for SubmissionWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionWorkflow {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            form: FormState::default(),
            field_errors: FieldErrors::default(),
            submit_error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn field_errors(&self) -> FieldErrors {
        self.field_errors
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    fn transition(&mut self, next: Phase) -> Result<(), WorkflowError> {
        if !self.phase.can_transition_to(next) {
            return Err(WorkflowError::IllegalTransition {
                from: self.phase,
                to: next,
            });
        }
        debug!(from = ?self.phase, to = ?next, "Submission phase change");
        self.phase = next;
        Ok(())
    }

    /// Open the dialog. Opening an already open dialog does nothing.
    pub fn open(&mut self) -> Result<(), WorkflowError> {
        match self.phase {
            Phase::Idle => self.transition(Phase::Editing),
            _ => Ok(()),
        }
    }

    /// Apply an edit to one field. Validation does not run until submit.
    pub fn edit_field(
        &mut self,
        field: Field,
        edit: impl FnOnce(&mut String),
    ) -> Result<(), WorkflowError> {
        match self.phase {
            Phase::Idle => return Err(WorkflowError::DialogClosed),
            Phase::Submitting => return Err(WorkflowError::SubmitInFlight),
            _ => {}
        }
        self.transition(Phase::Editing)?;
        edit(self.form.value_mut(field));
        Ok(())
    }

    pub fn set_field(&mut self, field: Field, value: &str) -> Result<(), WorkflowError> {
        self.edit_field(field, |current| {
            current.clear();
            current.push_str(value);
        })
    }

    /// Validate and, if valid, move to `Submitting`.
    ///
    /// A call while a submission is in flight is a no-op.
    pub fn begin_submit(&mut self) -> Result<SubmitStart, WorkflowError> {
        match self.phase {
            Phase::Idle => return Err(WorkflowError::DialogClosed),
            Phase::Submitting => {
                debug!("Submit ignored, already submitting");
                return Ok(SubmitStart::AlreadySubmitting);
            }
            _ => {}
        }

        self.transition(Phase::Validating)?;
        let errors = validate(&self.form);
        self.field_errors = errors;

        if errors.any() {
            debug!(?errors, "Validation failed");
            self.transition(Phase::Editing)?;
            return Ok(SubmitStart::Invalid(errors));
        }

        self.transition(Phase::Submitting)?;
        self.submit_error = None;
        Ok(SubmitStart::Ready(self.form.to_customer()))
    }

    /// Apply the result of the create request started by `begin_submit`.
    ///
    /// Success resets the form and closes the dialog; the caller is
    /// responsible for revalidating the collection. Failure keeps every field
    /// as it was and records a message.
    pub fn finish_submit(
        &mut self,
        result: Result<(), ApiError>,
    ) -> Result<SubmitOutcome, WorkflowError> {
        if self.phase != Phase::Submitting {
            return Err(WorkflowError::NotSubmitting);
        }

        match result {
            Ok(()) => {
                self.transition(Phase::SuccessClosing)?;
                self.reset();
                self.transition(Phase::Idle)?;
                info!("Customer submitted, dialog closed");
                Ok(SubmitOutcome::Created)
            }
            Err(error) => {
                self.transition(Phase::Failed)?;
                let message = if error.message.trim().is_empty() {
                    CREATE_FAILED_MESSAGE.to_string()
                } else {
                    error.message
                };
                warn!(code = %error.code, message = %message, "Customer submission failed");
                self.submit_error = Some(message.clone());
                self.transition(Phase::Editing)?;
                Ok(SubmitOutcome::Failed(message))
            }
        }
    }

    /// Run a whole submit attempt: validate, create, and on success
    /// revalidate the customer collection.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        revalidator: &dyn Revalidate,
    ) -> Result<SubmitOutcome, WorkflowError> {
        let customer = match self.begin_submit()? {
            SubmitStart::Invalid(errors) => return Ok(SubmitOutcome::Invalid(errors)),
            SubmitStart::AlreadySubmitting => return Ok(SubmitOutcome::Ignored),
            SubmitStart::Ready(customer) => customer,
        };

        let result = api.create_customer(&customer).await;
        let outcome = self.finish_submit(result)?;

        if outcome == SubmitOutcome::Created {
            revalidator.revalidate(CUSTOMERS_KEY).await;
        }

        Ok(outcome)
    }

    /// Close the dialog and discard everything typed.
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        match self.phase {
            Phase::Submitting => Err(WorkflowError::SubmitInFlight),
            Phase::Idle => Ok(()),
            _ => {
                self.transition(Phase::Idle)?;
                self.reset();
                Ok(())
            }
        }
    }

    fn reset(&mut self) {
        self.form = FormState::default();
        self.field_errors = FieldErrors::default();
        self.submit_error = None;
    }
}
