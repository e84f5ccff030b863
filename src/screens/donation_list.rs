use std::sync::{Arc, Mutex};

use super::{SharedApi, lock};
use crate::api::models::{Donation, DonationFilter, FoodType};
use crate::error::ScreenError;
use crate::resource::Remote;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
    /// `/api/donations` with the screen's filter.
    Filtered,
    /// `/api/donations/urgent`, no filter.
    Urgent,
}

impl ListSource {
    fn failure_message(self) -> &'static str {
        match self {
            ListSource::Filtered => "Failed to fetch donations",
            ListSource::Urgent => "Failed to fetch urgent donations",
        }
    }
}

#[derive(Debug, Default)]
struct State {
    filter: DonationFilter,
    donations: Remote<Vec<Donation>>,
}

/// Donation list and the urgent partition. Rows are exactly what the server
/// returned for the current query; nothing is filtered client-side.
#[derive(Clone)]
pub struct DonationListScreen {
    api: SharedApi,
    source: ListSource,
    state: Arc<Mutex<State>>,
}

impl DonationListScreen {
    pub fn all(api: SharedApi) -> Self {
        Self::with_source(api, ListSource::Filtered)
    }

    pub fn urgent(api: SharedApi) -> Self {
        Self::with_source(api, ListSource::Urgent)
    }

    fn with_source(api: SharedApi, source: ListSource) -> Self {
        Self {
            api,
            source,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn source(&self) -> ListSource {
        self.source
    }

    pub fn filter(&self) -> DonationFilter {
        lock(&self.state).filter.clone()
    }

    /// `None` is "All Types". Takes effect on the next `load`.
    pub fn set_food_type(&self, food_type: Option<FoodType>) {
        lock(&self.state).filter.food_type = food_type;
    }

    pub fn set_urgent_only(&self, urgent_only: bool) {
        lock(&self.state).filter.urgent_only = urgent_only;
    }

    pub async fn load(&self) {
        let (ticket, filter) = {
            let mut state = lock(&self.state);
            (state.donations.begin(), state.filter.clone())
        };

        let result = match self.source {
            ListSource::Filtered => self.api.donations(&filter).await,
            ListSource::Urgent => self.api.urgent_donations().await,
        };

        let mut state = lock(&self.state);
        match result {
            Ok(rows) => {
                log::debug!("Loaded {} donation(s)", rows.len());
                state.donations.resolve(ticket, rows);
            }
            Err(e) => {
                log::warn!("Donation list fetch failed: {}", e);
                let error = ScreenError::fetch(&e, self.source.failure_message());
                state.donations.fail(ticket, error);
            }
        }
    }

    pub fn donations(&self) -> Remote<Vec<Donation>> {
        lock(&self.state).donations.clone()
    }

    /// Both list views show the empty message after a fetch with no rows.
    pub fn shows_empty_state(&self) -> bool {
        lock(&self.state).donations.is_empty_result()
    }

    pub fn empty_message(&self) -> &'static str {
        match self.source {
            ListSource::Filtered => "No donations match these filters.",
            ListSource::Urgent => "No urgent donations at the moment.",
        }
    }
}
