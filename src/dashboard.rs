//! Dashboard controller.
//!
//! Drives a [`DashboardView`] from the scoring API: fetches and renders the
//! lead table, submits new leads and manages the submit button's loading state.

use crate::errors::{AppError, FetchFailure, SubmitFailure, FETCH_FAILURE_ALERT};
use crate::models::{sort_by_reranked_desc, LeadForm, ScoredLead};
use crate::page::SubmitButton;
use crate::render::render_leads;
use crate::scoring_client::ScoringApiClient;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Page elements the controller writes to.
pub trait DashboardView: Send + Sync {
    /// Applies state to `submit-btn` and its label/spinner.
    fn apply_submit_button(&self, button: SubmitButton);
    /// Replaces every row of `leads-table-body`.
    fn replace_table_rows(&self, rows: Vec<String>);
    fn set_no_leads_message_visible(&self, visible: bool);
    /// Blocking user-facing alert.
    fn alert(&self, message: &str);
    /// Clears every field of `lead-form`.
    fn reset_form(&self);
}

/// Result of a refresh that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The table now shows this many leads.
    Rendered(usize),
    /// A newer refresh was applied while this one was in flight; nothing was applied.
    Stale,
}

pub struct DashboardController<V: DashboardView> {
    client: ScoringApiClient,
    view: V,
    /// Generation handed to the next refresh.
    next_generation: AtomicU64,
    /// Generation of the refresh whose leads are on the table.
    applied_generation: Mutex<u64>,
}

/// Restores the idle submit button when dropped.
struct LoadingGuard<'a, V: DashboardView> {
    controller: &'a DashboardController<V>,
}

impl<V: DashboardView> Drop for LoadingGuard<'_, V> {
    fn drop(&mut self) {
        self.controller.toggle_loading(false);
    }
}

impl<V: DashboardView> DashboardController<V> {
    pub fn new(client: ScoringApiClient, view: V) -> Self {
        Self {
            client,
            view,
            next_generation: AtomicU64::new(0),
            applied_generation: Mutex::new(0),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn toggle_loading(&self, is_loading: bool) {
        let button = if is_loading {
            SubmitButton::LOADING
        } else {
            SubmitButton::IDLE
        };
        self.view.apply_submit_button(button);
    }

    /// Replaces the table with `leads` in the given order.
    pub fn render_leads(&self, leads: &[ScoredLead]) {
        let table = render_leads(leads);
        self.view.replace_table_rows(table.rows);
        self.view
            .set_no_leads_message_visible(table.show_no_leads_message);
    }

    /// Fetches all leads, sorts them by reranked score and renders them.
    ///
    /// Failures are logged and alerted before being returned. A refresh that
    /// finishes after a newer one has rendered is dropped; a newer refresh that
    /// was cancelled or failed does not block it.
    pub async fn fetch_and_render_leads(&self) -> Result<RefreshOutcome, FetchFailure> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self.client.fetch_leads().await;

        // Held across the check and the render so two completions cannot interleave.
        let mut applied = self.applied();
        if *applied > generation {
            tracing::debug!(
                "Discarding stale refresh result (generation {}, applied {})",
                generation,
                *applied
            );
            return Ok(RefreshOutcome::Stale);
        }

        match result {
            Ok(mut leads) => {
                sort_by_reranked_desc(&mut leads);
                self.render_leads(&leads);
                *applied = generation;
                Ok(RefreshOutcome::Rendered(leads.len()))
            }
            Err(e) => {
                drop(applied);
                tracing::error!("{}", AppError::from(e.clone()));
                self.view.alert(FETCH_FAILURE_ALERT);
                Err(e)
            }
        }
    }

    fn applied(&self) -> MutexGuard<'_, u64> {
        self.applied_generation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Form submission: coerce, POST, then refresh and clear the form.
    ///
    /// The submit button is back to idle on every exit, including when the
    /// returned future is dropped before completion.
    pub async fn submit_lead(&self, form: &LeadForm) -> Result<(), SubmitFailure> {
        self.toggle_loading(true);
        let _guard = LoadingGuard { controller: self };

        let payload = form.to_payload();
        match self.client.submit_lead(&payload).await {
            Ok(()) => {
                // The lead was scored even if the refresh fails; that failure has its own alert.
                if let Err(e) = self.fetch_and_render_leads().await {
                    tracing::warn!("Lead scored but the lead list could not be refreshed: {}", e);
                }
                self.view.reset_form();
                Ok(())
            }
            Err(e) => {
                tracing::error!(status = ?e.status(), "{}", AppError::from(e.clone()));
                self.view.alert(&e.alert_text());
                Err(e)
            }
        }
    }
}
