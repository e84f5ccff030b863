use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use super::{SharedApi, lock};
use crate::api::models::{TimeSlot, VehicleType, VolunteerSignup};
use crate::error::ScreenError;
use crate::router::Route;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignupDraft {
    pub availability: BTreeSet<TimeSlot>,
    /// `None` until the user picks one; "No Vehicle" is a real choice.
    pub vehicle: Option<VehicleType>,
    pub area: String,
    pub experience: String,
    pub phone_number: String,
    pub emergency_contact: String,
}

impl SignupDraft {
    pub fn validate(&self) -> Result<VolunteerSignup, ScreenError> {
        let vehicle = self
            .vehicle
            .ok_or_else(|| ScreenError::invalid("Select a vehicle type"))?;
        let required = [
            (&self.area, "Preferred area is required"),
            (&self.phone_number, "Phone number is required"),
            (&self.emergency_contact, "Emergency contact is required"),
        ];
        for (value, message) in required {
            if value.trim().is_empty() {
                return Err(ScreenError::invalid(message));
            }
        }
        Ok(VolunteerSignup {
            availability: self.availability.iter().copied().collect(),
            vehicle,
            area: self.area.trim().to_string(),
            experience: self.experience.clone(),
            phone_number: self.phone_number.trim().to_string(),
            emergency_contact: self.emergency_contact.trim().to_string(),
        })
    }
}

#[derive(Debug, Default)]
struct State {
    draft: SignupDraft,
    submitting: bool,
    error: Option<ScreenError>,
}

#[derive(Clone)]
pub struct VolunteerSignupScreen {
    api: SharedApi,
    state: Arc<Mutex<State>>,
}

impl VolunteerSignupScreen {
    pub fn new(api: SharedApi) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn draft(&self) -> SignupDraft {
        lock(&self.state).draft.clone()
    }

    /// Checkbox change: union when checked, difference when not.
    pub fn toggle_slot(&self, slot: TimeSlot, checked: bool) {
        let mut state = lock(&self.state);
        if checked {
            state.draft.availability.insert(slot);
        } else {
            state.draft.availability.remove(&slot);
        }
    }

    pub fn set_vehicle(&self, vehicle: Option<VehicleType>) {
        lock(&self.state).draft.vehicle = vehicle;
    }

    pub fn set_area(&self, area: &str) {
        lock(&self.state).draft.area = area.to_string();
    }

    pub fn set_experience(&self, experience: &str) {
        lock(&self.state).draft.experience = experience.to_string();
    }

    pub fn set_phone_number(&self, phone: &str) {
        lock(&self.state).draft.phone_number = phone.to_string();
    }

    pub fn set_emergency_contact(&self, contact: &str) {
        lock(&self.state).draft.emergency_contact = contact.to_string();
    }

    pub fn validate(&self) -> Result<VolunteerSignup, ScreenError> {
        lock(&self.state).draft.validate()
    }

    pub fn is_submitting(&self) -> bool {
        lock(&self.state).submitting
    }

    pub fn error(&self) -> Option<ScreenError> {
        lock(&self.state).error.clone()
    }

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

        let result = self.api.volunteer_signup(&body).await;

        let mut state = lock(&self.state);
        state.submitting = false;
        match result {
            Ok(()) => {
                log::info!("Volunteer signup accepted");
                Some(Route::Tasks)
            }
            Err(e) => {
                log::warn!("Volunteer signup failed: {}", e);
                state.error = Some(ScreenError::submit(&e, "Failed to sign up as volunteer"));
                None
            }
        }
    }
}
