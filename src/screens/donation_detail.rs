use std::sync::{Arc, Mutex};

use super::{MapMarker, SharedApi, lock};
use crate::api::models::{Donation, DonationStatus};
use crate::error::ScreenError;
use crate::resource::Remote;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolunteerOutcome {
    Succeeded,
    Failed,
}

impl VolunteerOutcome {
    pub fn message(self) -> &'static str {
        match self {
            VolunteerOutcome::Succeeded => "Successfully volunteered for pickup!",
            VolunteerOutcome::Failed => "Failed to volunteer for pickup. Please try again.",
        }
    }
}

#[derive(Debug, Default)]
struct State {
    donation: Remote<Donation>,
    outcome: Option<VolunteerOutcome>,
}

#[derive(Clone)]
pub struct DonationDetailScreen {
    api: SharedApi,
    id: String,
    state: Arc<Mutex<State>>,
}

impl DonationDetailScreen {
    pub fn new(api: SharedApi, id: impl Into<String>) -> Self {
        Self {
            api,
            id: id.into(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn load(&self) {
        let ticket = lock(&self.state).donation.begin();
        let result = self.api.donation(&self.id).await;
        let mut state = lock(&self.state);
        match result {
            Ok(donation) => {
                state.donation.resolve(ticket, donation);
            }
            Err(e) => {
                log::warn!("Fetching donation {} failed: {}", self.id, e);
                let error = ScreenError::fetch(&e, "Failed to fetch donation details");
                state.donation.fail(ticket, error);
            }
        }
    }

    pub fn donation(&self) -> Remote<Donation> {
        lock(&self.state).donation.clone()
    }

    /// Offered only while the displayed donation is still available.
    pub fn can_volunteer(&self) -> bool {
        lock(&self.state)
            .donation
            .data()
            .is_some_and(|d| d.status == DonationStatus::Available)
    }

    /// Single POST, no confirmation, no optimistic change. Success re-fetches
    /// the donation; failure leaves the displayed data as it was.
    pub async fn volunteer(&self) {
        log::info!("Volunteering for donation {}", self.id);
        match self.api.volunteer_for_donation(&self.id).await {
            Ok(()) => {
                lock(&self.state).outcome = Some(VolunteerOutcome::Succeeded);
                self.load().await;
            }
            Err(e) => {
                log::warn!("Volunteering for {} failed: {}", self.id, e);
                lock(&self.state).outcome = Some(VolunteerOutcome::Failed);
            }
        }
    }

    pub fn volunteer_outcome(&self) -> Option<VolunteerOutcome> {
        lock(&self.state).outcome
    }

    pub fn map_markers(&self) -> Vec<MapMarker> {
        lock(&self.state)
            .donation
            .data()
            .and_then(MapMarker::for_donation)
            .into_iter()
            .collect()
    }
}
