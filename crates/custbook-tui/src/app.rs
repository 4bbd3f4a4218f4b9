//! Application state management for custbook.
//!
//! This module contains the core `App` struct: UI state, the customer
//! subscription, the add-customer workflow, and background task coordination.

use custbook_core::api::{ApiClient, ApiError, CUSTOMERS_KEY};
use custbook_core::cache::{CacheSnapshot, RemoteCache};
use custbook_core::models::Customers;
use custbook_core::submission::{
    Field, SubmissionWorkflow, SubmitOutcome, SubmitStart, WorkflowError,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for any form field.
const MAX_FIELD_LENGTH: usize = 100;

/// Number of rows to move on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    AddingCustomer,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Focus inside the add-customer dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogFocus {
    Field(Field),
    Create,
    Cancel,
}

impl Default for DialogFocus {
    fn default() -> Self {
        DialogFocus::Field(Field::FirstName)
    }
}

impl DialogFocus {
    /// Next focus target (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            DialogFocus::Field(Field::FirstName) => DialogFocus::Field(Field::LastName),
            DialogFocus::Field(Field::LastName) => DialogFocus::Field(Field::BusinessName),
            DialogFocus::Field(Field::BusinessName) => DialogFocus::Field(Field::Email),
            DialogFocus::Field(Field::Email) => DialogFocus::Create,
            DialogFocus::Create => DialogFocus::Cancel,
            DialogFocus::Cancel => DialogFocus::Field(Field::FirstName),
        }
    }

    /// Previous focus target (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            DialogFocus::Field(Field::FirstName) => DialogFocus::Cancel,
            DialogFocus::Field(Field::LastName) => DialogFocus::Field(Field::FirstName),
            DialogFocus::Field(Field::BusinessName) => DialogFocus::Field(Field::LastName),
            DialogFocus::Field(Field::Email) => DialogFocus::Field(Field::BusinessName),
            DialogFocus::Create => DialogFocus::Field(Field::Email),
            DialogFocus::Cancel => DialogFocus::Create,
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned tasks back to the main loop.
enum BackgroundResult {
    /// The create request for a new customer finished
    CustomerCreated(Result<(), ApiError>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub api: ApiClient,
    pub cache: RemoteCache<Customers>,
    customers: watch::Receiver<CacheSnapshot<Customers>>,

    // UI State
    pub state: AppState,
    pub selection: usize,
    pub status_message: Option<String>,

    // Add-customer dialog
    pub form: SubmissionWorkflow,
    pub dialog_focus: DialogFocus,

    // Background task channel
    result_rx: mpsc::Receiver<BackgroundResult>,
    result_tx: mpsc::Sender<BackgroundResult>,
}

impl App {
    /// Create the application and start loading customers.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(api: ApiClient) -> Self {
        let cache = RemoteCache::new(std::sync::Arc::new(api.clone()));
        let customers = cache.subscribe(CUSTOMERS_KEY);
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            api,
            cache,
            customers,

            state: AppState::Normal,
            selection: 0,
            status_message: None,

            form: SubmissionWorkflow::new(),
            dialog_focus: DialogFocus::default(),

            result_rx: rx,
            result_tx: tx,
        }
    }

    /// Latest published state of the customer collection
    pub fn customers(&self) -> watch::Ref<'_, CacheSnapshot<Customers>> {
        self.customers.borrow()
    }

    fn customer_count(&self) -> usize {
        self.customers().data.as_ref().map_or(0, Vec::len)
    }

    // =========================================================================
    // Customer list
    // =========================================================================

    /// Re-fetch the customer list in the background
    pub fn refresh(&mut self) {
        info!("Refreshing customers");
        self.cache.revalidate_in_background(CUSTOMERS_KEY);
        self.status_message = Some("Refreshing customers...".to_string());
    }

    pub fn select_next(&mut self, step: usize) {
        let count = self.customer_count();
        if count > 0 {
            self.selection = (self.selection + step).min(count - 1);
        }
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selection = self.selection.saturating_sub(step);
    }

    fn clamp_selection(&mut self) {
        let count = self.customer_count();
        self.selection = self.selection.min(count.saturating_sub(1));
    }

    // =========================================================================
    // Add-customer dialog
    // =========================================================================

    pub fn open_dialog(&mut self) {
        if let Err(e) = self.form.open() {
            warn!(error = %e, "Could not open dialog");
            return;
        }
        self.dialog_focus = DialogFocus::default();
        self.state = AppState::AddingCustomer;
    }

    /// Close the dialog, discarding input. Refused while submitting.
    pub fn cancel_dialog(&mut self) {
        match self.form.cancel() {
            Ok(()) => {
                self.dialog_focus = DialogFocus::default();
                self.state = AppState::Normal;
            }
            Err(WorkflowError::SubmitInFlight) => {
                self.status_message = Some("Please wait, saving customer...".to_string());
            }
            Err(e) => warn!(error = %e, "Could not cancel dialog"),
        }
    }

    /// Type a character into the focused field
    pub fn type_char(&mut self, c: char) {
        let DialogFocus::Field(field) = self.dialog_focus else {
            return;
        };
        if !can_add_field_char(self.form.form().value(field).chars().count(), c) {
            return;
        }
        if let Err(e) = self.form.edit_field(field, |value| value.push(c)) {
            debug!(error = %e, "Edit ignored");
        }
    }

    /// Delete the last character of the focused field
    pub fn backspace(&mut self) {
        let DialogFocus::Field(field) = self.dialog_focus else {
            return;
        };
        if let Err(e) = self.form.edit_field(field, |value| {
            value.pop();
        }) {
            debug!(error = %e, "Edit ignored");
        }
    }

    /// Validate the form and, if valid, send the create request in the background
    pub fn submit_dialog(&mut self) {
        let customer = match self.form.begin_submit() {
            Ok(SubmitStart::Ready(customer)) => customer,
            Ok(SubmitStart::Invalid(errors)) => {
                // Jump to the first field that needs attention
                if let Some(field) = Field::ALL.iter().find(|f| errors.has_error(**f)) {
                    self.dialog_focus = DialogFocus::Field(*field);
                }
                return;
            }
            Ok(SubmitStart::AlreadySubmitting) => return,
            Err(e) => {
                warn!(error = %e, "Submit rejected");
                return;
            }
        };

        let api = self.api.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = api.create_customer(&customer).await;
            Self::send_result(&tx, BackgroundResult::CustomerCreated(result)).await;
        });

        self.status_message = Some("Saving customer...".to_string());
    }

    /// Helper to send background results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send background result - channel closed");
        }
    }

    // =========================================================================
    // Background tasks
    // =========================================================================

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            self.process_background_result(result);
        }
        self.clamp_selection();

        if self.status_message.as_deref() == Some("Refreshing customers...")
            && self.customers().is_settled()
        {
            self.status_message = None;
        }
    }

    fn process_background_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::CustomerCreated(result) => match self.form.finish_submit(result) {
                Ok(SubmitOutcome::Created) => {
                    self.cache.revalidate_in_background(CUSTOMERS_KEY);
                    self.dialog_focus = DialogFocus::default();
                    self.state = AppState::Normal;
                    self.status_message = Some("Customer added".to_string());
                }
                Ok(SubmitOutcome::Failed(_)) => {
                    // Message is shown inside the dialog
                    self.status_message = None;
                }
                Ok(outcome) => debug!(?outcome, "Unexpected submit outcome"),
                Err(e) => warn!(error = %e, "Dropped stale create result"),
            },
        }
    }
}

/// Header text for the customer table
pub fn header_title(snapshot: &CacheSnapshot<Customers>) -> String {
    if snapshot.is_loading() {
        "Loading...".to_string()
    } else {
        format!("{} Customers", snapshot.data.as_ref().map_or(0, Vec::len))
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a character should be accepted into a form field
pub fn can_add_field_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FIELD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use custbook_core::api::Response;
    use custbook_core::models::Customer;
    use custbook_core::testing::InMemoryServer;

    fn customer(first: &str, email: &str) -> Customer {
        Customer {
            first_name: first.to_string(),
            last_name: "Tester".to_string(),
            email: email.to_string(),
            business_name: None,
        }
    }

    /// Pump background results until `done` holds
    async fn settle(app: &mut App, done: impl Fn(&App) -> bool) {
        for _ in 0..200 {
            app.check_background_tasks();
            if done(app) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("app never reached the expected state");
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.type_char(c);
        }
    }

    fn fill_form(app: &mut App, first: &str, last: &str, email: &str) {
        app.dialog_focus = DialogFocus::Field(Field::FirstName);
        type_str(app, first);
        app.dialog_focus = DialogFocus::Field(Field::LastName);
        type_str(app, last);
        app.dialog_focus = DialogFocus::Field(Field::Email);
        type_str(app, email);
    }

    // -------------------------------------------------------------------------
    // DialogFocus Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_dialog_focus_next_cycles() {
        let mut focus = DialogFocus::default();
        let mut seen = vec![focus];
        for _ in 0..5 {
            focus = focus.next();
            seen.push(focus);
        }
        assert_eq!(focus, DialogFocus::Cancel);
        assert_eq!(focus.next(), DialogFocus::default());
        assert_eq!(seen[4], DialogFocus::Create);
    }

    #[test]
    fn test_dialog_focus_prev_inverts_next() {
        let mut focus = DialogFocus::default();
        for _ in 0..6 {
            assert_eq!(focus.next().prev(), focus);
            focus = focus.next();
        }
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_field_char() {
        assert!(can_add_field_char(0, 'a'));
        assert!(can_add_field_char(99, '@'));
        assert!(!can_add_field_char(100, 'a'));
        assert!(!can_add_field_char(0, '\x00'));
        assert!(!can_add_field_char(0, '\n'));
        assert!(!can_add_field_char(0, '\t'));
    }

    #[test]
    fn test_header_title() {
        assert_eq!(header_title(&CacheSnapshot::default()), "0 Customers");
    }

    // -------------------------------------------------------------------------
    // App Flow Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_app_loads_customers() {
        let server = Arc::new(InMemoryServer::with_customers(vec![
            customer("Ann", "ann@x.com"),
            customer("Bob", "bob@x.com"),
        ]));
        let mut app = App::new(ApiClient::new(server.clone()));
        assert_eq!(header_title(&app.customers()), "Loading...");

        settle(&mut app, |app| app.customers().is_settled()).await;
        assert_eq!(header_title(&app.customers()), "2 Customers");

        app.select_next(PAGE_SCROLL_SIZE);
        assert_eq!(app.selection, 1);
        assert_eq!(app.customers().data.as_ref().unwrap()[app.selection].email, "bob@x.com");
        app.select_prev(1);
        assert_eq!(app.selection, 0);
    }

    #[tokio::test]
    async fn test_add_customer_closes_dialog_and_refreshes() {
        let server = Arc::new(InMemoryServer::new());
        let mut app = App::new(ApiClient::new(server.clone()));
        settle(&mut app, |app| app.customers().is_settled()).await;

        app.open_dialog();
        assert_eq!(app.state, AppState::AddingCustomer);
        fill_form(&mut app, "Jane", "Doe", "j@d.com");
        app.submit_dialog();
        assert!(app.form.is_submitting());

        // A second submit while the first is in flight sends nothing
        app.submit_dialog();

        settle(&mut app, |app| {
            app.state == AppState::Normal && app.customers().data.as_ref().map_or(0, Vec::len) == 1
        })
        .await;
        assert_eq!(server.writes(), 1);
        assert!(!app.form.is_open());
        assert_eq!(app.form.form().first_name, "");
        assert_eq!(app.status_message.as_deref(), Some("Customer added"));
    }

    #[tokio::test]
    async fn test_failed_add_keeps_dialog_open() {
        let server = Arc::new(InMemoryServer::new());
        server.fail_writes(Response::new(422, r#"{"code": "Invalid", "message": "Email taken"}"#));
        let mut app = App::new(ApiClient::new(server.clone()));

        app.open_dialog();
        fill_form(&mut app, "Jane", "Doe", "j@d.com");
        app.submit_dialog();
        settle(&mut app, |app| !app.form.is_submitting()).await;

        assert_eq!(app.state, AppState::AddingCustomer);
        assert_eq!(app.form.submit_error(), Some("Email taken"));
        assert_eq!(app.form.form().email, "j@d.com");

        // Fix the server and retry from the same form
        server.clear_failures();
        app.submit_dialog();
        settle(&mut app, |app| app.state == AppState::Normal).await;
        assert_eq!(server.customers().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_submit_focuses_first_bad_field() {
        let server = Arc::new(InMemoryServer::new());
        let mut app = App::new(ApiClient::new(server.clone()));

        app.open_dialog();
        app.dialog_focus = DialogFocus::Field(Field::FirstName);
        type_str(&mut app, "Jane");
        app.dialog_focus = DialogFocus::Create;
        app.submit_dialog();

        assert_eq!(app.dialog_focus, DialogFocus::Field(Field::LastName));
        assert!(app.form.field_errors().last_name);
        assert!(app.form.field_errors().email);
        assert_eq!(server.writes(), 0);

        app.cancel_dialog();
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.form.form().first_name, "");
    }
}
