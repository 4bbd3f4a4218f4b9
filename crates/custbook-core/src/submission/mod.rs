//! Add-customer submission workflow.
//!
//! - `form`: field values, per-field validation, the create payload
//! - `workflow`: the dialog state machine that validates, creates, and hands
//!   off to the cache for revalidation

pub mod form;
pub mod workflow;

pub use form::{validate, Field, FieldErrors, FormState};
pub use workflow::{Phase, SubmissionWorkflow, SubmitOutcome, SubmitStart, WorkflowError};
