use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

use super::{SharedApi, lock};
use crate::api::models::{FoodType, NewDonation};
use crate::error::ScreenError;
use crate::router::Route;

/// Raw form input, as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationDraft {
    pub food_type: Option<FoodType>,
    pub quantity: String,
    /// `YYYY-MM-DD`
    pub expiry_date: String,
    pub pickup_address: String,
    pub description: String,
    pub is_urgent: bool,
}

impl DonationDraft {
    /// Required-field checks only. A past expiry date is accepted.
    pub fn validate(&self) -> Result<NewDonation, ScreenError> {
        let food_type = self
            .food_type
            .filter(|t| *t != FoodType::Unknown)
            .ok_or_else(|| ScreenError::invalid("Select a food type"))?;
        let quantity: f64 = self
            .quantity
            .trim()
            .parse()
            .ok()
            .filter(|q: &f64| q.is_finite())
            .ok_or_else(|| ScreenError::invalid("Quantity must be a number"))?;
        let expiry_date = NaiveDate::parse_from_str(self.expiry_date.trim(), "%Y-%m-%d")
            .map_err(|_| ScreenError::invalid("Expiry date must be YYYY-MM-DD"))?;
        let pickup_address = self.pickup_address.trim();
        if pickup_address.is_empty() {
            return Err(ScreenError::invalid("Pickup address is required"));
        }
        Ok(NewDonation {
            food_type,
            quantity,
            expiry_date,
            pickup_address: pickup_address.to_string(),
            description: self.description.clone(),
            is_urgent: self.is_urgent,
        })
    }
}

#[derive(Debug, Default)]
struct State {
    draft: DonationDraft,
    submitting: bool,
    error: Option<ScreenError>,
}

#[derive(Clone)]
pub struct DonationFormScreen {
    api: SharedApi,
    state: Arc<Mutex<State>>,
}

impl DonationFormScreen {
    pub fn new(api: SharedApi) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Pre-checks "Mark as Urgent", used from the urgent donations view.
    pub fn urgent(api: SharedApi) -> Self {
        let screen = Self::new(api);
        screen.set_urgent(true);
        screen
    }

    pub fn draft(&self) -> DonationDraft {
        lock(&self.state).draft.clone()
    }

    pub fn set_food_type(&self, food_type: Option<FoodType>) {
        lock(&self.state).draft.food_type = food_type;
    }

    pub fn set_quantity(&self, quantity: &str) {
        lock(&self.state).draft.quantity = quantity.to_string();
    }

    pub fn set_expiry_date(&self, date: &str) {
        lock(&self.state).draft.expiry_date = date.to_string();
    }

    pub fn set_pickup_address(&self, address: &str) {
        lock(&self.state).draft.pickup_address = address.to_string();
    }

    pub fn set_description(&self, description: &str) {
        lock(&self.state).draft.description = description.to_string();
    }

    pub fn set_urgent(&self, urgent: bool) {
        lock(&self.state).draft.is_urgent = urgent;
    }

    pub fn validate(&self) -> Result<NewDonation, ScreenError> {
        lock(&self.state).draft.validate()
    }

    pub fn is_submitting(&self) -> bool {
        lock(&self.state).submitting
    }

    pub fn error(&self) -> Option<ScreenError> {
        lock(&self.state).error.clone()
    }

    /// Returns where to navigate on success. A submit while another is in
    /// flight is ignored.
    pub async fn submit(&self) -> Option<Route> {
        let body = {
            let mut state = lock(&self.state);
            if state.submitting {
                return None;
            }
            match state.draft.validate() {
                Ok(body) => {
                    state.submitting = true;
                    state.error = None;
                    body
                }
                Err(e) => {
                    state.error = Some(e);
                    return None;
                }
            }
        };

        let result = self.api.create_donation(&body).await;

        let mut state = lock(&self.state);
        state.submitting = false;
        match result {
            Ok(()) => {
                log::info!("Donation created");
                Some(Route::Donations)
            }
            Err(e) => {
                log::warn!("Creating donation failed: {}", e);
                state.error = Some(ScreenError::submit(&e, "Failed to create donation"));
                None
            }
        }
    }
}
