use std::sync::{Arc, Mutex};

use super::{SharedApi, lock};
use crate::api::models::{Donation, TaskAssignment, Volunteer};
use crate::error::ScreenError;
use crate::resource::Remote;

/// Both pools, fetched together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentBoard {
    pub volunteers: Vec<Volunteer>,
    pub donations: Vec<Donation>,
}

#[derive(Debug, Default)]
struct State {
    board: Remote<AssignmentBoard>,
    donation_id: String,
    volunteer_id: String,
    note: String,
    submitting: bool,
    error: Option<ScreenError>,
}

#[derive(Clone)]
pub struct TaskAssignmentScreen {
    api: SharedApi,
    state: Arc<Mutex<State>>,
}

impl TaskAssignmentScreen {
    pub fn new(api: SharedApi) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Fetches available volunteers and unassigned donations concurrently;
    /// nothing is shown until both have arrived.
    pub async fn load(&self) {
        let ticket = lock(&self.state).board.begin();
        let result = futures::try_join!(
            self.api.available_volunteers(),
            self.api.unassigned_donations()
        );
        let mut state = lock(&self.state);
        match result {
            Ok((volunteers, donations)) => {
                log::debug!(
                    "{} volunteer(s), {} unassigned donation(s)",
                    volunteers.len(),
                    donations.len()
                );
                state.board.resolve(
                    ticket,
                    AssignmentBoard {
                        volunteers,
                        donations,
                    },
                );
            }
            Err(e) => {
                log::warn!("Fetching assignment data failed: {}", e);
                state.board.fail(ticket, ScreenError::fetch(&e, "Failed to fetch data"));
            }
        }
    }

    pub fn board(&self) -> Remote<AssignmentBoard> {
        lock(&self.state).board.clone()
    }

    pub fn select_donation(&self, id: &str) {
        lock(&self.state).donation_id = id.to_string();
    }

    pub fn select_volunteer(&self, id: &str) {
        lock(&self.state).volunteer_id = id.to_string();
    }

    pub fn set_note(&self, note: &str) {
        lock(&self.state).note = note.to_string();
    }

    /// Current `(donation, volunteer, note)` inputs.
    pub fn selection(&self) -> (String, String, String) {
        let state = lock(&self.state);
        (
            state.donation_id.clone(),
            state.volunteer_id.clone(),
            state.note.clone(),
        )
    }

    pub fn is_submitting(&self) -> bool {
        lock(&self.state).submitting
    }

    pub fn error(&self) -> Option<ScreenError> {
        let state = lock(&self.state);
        state.error.clone().or_else(|| state.board.error().cloned())
    }

    /// Posts the pairing. On success the inputs are cleared and both pools
    /// re-fetched; the assigned donation is never removed locally.
    pub async fn submit(&self) -> bool {
        let body = {
            let mut state = lock(&self.state);
            if state.submitting {
                return false;
            }
            if state.donation_id.is_empty() || state.volunteer_id.is_empty() {
                state.error = Some(ScreenError::invalid("Choose a donation and a volunteer"));
                return false;
            }
            state.submitting = true;
            state.error = None;
            TaskAssignment {
                donation_id: state.donation_id.clone(),
                volunteer_id: state.volunteer_id.clone(),
                note: state.note.clone(),
            }
        };

        log::info!(
            "Assigning donation {} to volunteer {}",
            body.donation_id,
            body.volunteer_id
        );
        let result = self.api.assign_task(&body).await;

        {
            let mut state = lock(&self.state);
            state.submitting = false;
            if let Err(e) = result {
                log::warn!("Task assignment failed: {}", e);
                state.error = Some(ScreenError::submit(&e, "Failed to assign task"));
                return false;
            }
            state.donation_id.clear();
            state.volunteer_id.clear();
            state.note.clear();
        }
        self.load().await;
        true
    }

    /// Fetched donations that carry an assignee. Derived locally, no request.
    pub fn current_assignments(&self) -> Vec<Donation> {
        lock(&self.state)
            .board
            .data()
            .map(|board| {
                board
                    .donations
                    .iter()
                    .filter(|d| d.assignee().is_some())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
