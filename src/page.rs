use crate::dashboard::DashboardView;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

/// Visual state of `submit-btn` and its label/spinner children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitButton {
    pub disabled: bool,
    pub label_visible: bool,
    pub spinner_visible: bool,
}

impl SubmitButton {
    pub const IDLE: SubmitButton = SubmitButton {
        disabled: false,
        label_visible: true,
        spinner_visible: false,
    };

    pub const LOADING: SubmitButton = SubmitButton {
        disabled: true,
        label_visible: false,
        spinner_visible: true,
    };
}

impl Default for SubmitButton {
    fn default() -> Self {
        SubmitButton::IDLE
    }
}

/// Point-in-time copy of the page elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSnapshot {
    pub table_rows: Vec<String>,
    pub no_leads_visible: bool,
    pub submit_button: SubmitButton,
    /// Values kept in `lead-form` (cleared by a form reset).
    pub form_values: Vec<(String, String)>,
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl PageSnapshot {
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form_values
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
struct PageState {
    snapshot: PageSnapshot,
    pending_alerts: Vec<String>,
}

/// In-process page shared between the controller and the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct SharedPage {
    inner: Arc<Mutex<PageState>>,
}

impl SharedPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.lock().snapshot.clone()
    }

    /// Keeps entered values visible until the form is reset.
    pub fn set_form_values(&self, values: Vec<(String, String)>) {
        self.lock().snapshot.form_values = values;
    }

    /// Alerts raised since the last call, oldest first.
    pub fn take_alerts(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().pending_alerts)
    }
}

impl DashboardView for SharedPage {
    fn apply_submit_button(&self, button: SubmitButton) {
        self.lock().snapshot.submit_button = button;
    }

    fn replace_table_rows(&self, rows: Vec<String>) {
        let mut state = self.lock();
        state.snapshot.table_rows = rows;
        state.snapshot.last_refreshed = Some(Utc::now());
    }

    fn set_no_leads_message_visible(&self, visible: bool) {
        self.lock().snapshot.no_leads_visible = visible;
    }

    fn alert(&self, message: &str) {
        self.lock().pending_alerts.push(message.to_string());
    }

    fn reset_form(&self) {
        self.lock().snapshot.form_values.clear();
    }
}
