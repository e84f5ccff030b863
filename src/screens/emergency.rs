use std::sync::{Arc, Mutex};

use super::{SharedApi, lock};
use crate::api::models::EmergencyStatus;
use crate::config::DeactivationPolicy;
use crate::error::ScreenError;
use crate::resource::Remote;

#[derive(Debug, Default)]
struct State {
    status: Remote<EmergencyStatus>,
    action_error: Option<ScreenError>,
}

/// The deployment-wide emergency switch.
///
/// The held status is what the server last returned, plus any local edits.
/// Toggle and update both replace it with the server's response.
#[derive(Clone)]
pub struct EmergencyScreen {
    api: SharedApi,
    policy: DeactivationPolicy,
    state: Arc<Mutex<State>>,
}

impl EmergencyScreen {
    pub fn new(api: SharedApi, policy: DeactivationPolicy) -> Self {
        Self {
            api,
            policy,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub async fn load(&self) {
        let ticket = lock(&self.state).status.begin();
        let result = self.api.emergency_status().await;
        let mut state = lock(&self.state);
        match result {
            Ok(status) => {
                state.status.resolve(ticket, status);
            }
            Err(e) => {
                log::warn!("Fetching emergency status failed: {}", e);
                let error = ScreenError::fetch(&e, "Failed to fetch emergency status");
                state.status.fail(ticket, error);
            }
        }
    }

    pub fn status(&self) -> Remote<EmergencyStatus> {
        lock(&self.state).status.clone()
    }

    /// Held status, or the inactive default before anything was fetched.
    pub fn held(&self) -> EmergencyStatus {
        lock(&self.state).status.data().cloned().unwrap_or_default()
    }

    /// The toggle works from the held status, the inactive default included,
    /// so it is only withheld while a fetch is in flight.
    pub fn can_toggle(&self) -> bool {
        !lock(&self.state).status.is_loading()
    }

    pub fn is_active(&self) -> bool {
        lock(&self.state).status.data().is_some_and(|s| s.active)
    }

    /// Action failures take precedence over the load failure.
    pub fn error(&self) -> Option<ScreenError> {
        let state = lock(&self.state);
        state
            .action_error
            .clone()
            .or_else(|| state.status.error().cloned())
    }

    fn edit(&self, f: impl FnOnce(&mut EmergencyStatus)) {
        let mut state = lock(&self.state);
        if let Some(status) = state.status.data_mut() {
            f(status);
        }
    }

    pub fn set_location(&self, location: &str) {
        self.edit(|s| s.location = location.to_string());
    }

    pub fn set_description(&self, description: &str) {
        self.edit(|s| s.description = description.to_string());
    }

    /// Appends an empty entry for the user to fill in.
    pub fn add_item(&self) {
        self.edit(|s| s.required_items.push(String::new()));
    }

    pub fn edit_item(&self, index: usize, value: &str) {
        self.edit(|s| {
            if let Some(item) = s.required_items.get_mut(index) {
                *item = value.to_string();
            }
        });
    }

    pub fn remove_item(&self, index: usize) {
        self.edit(|s| {
            if index < s.required_items.len() {
                s.required_items.remove(index);
            }
        });
    }

    /// Body sent by `toggle`: the negated flag plus the held details, unless
    /// deactivating under [`DeactivationPolicy::ClearDetails`].
    pub fn toggle_request(&self) -> EmergencyStatus {
        let held = self.held();
        let active = !held.active;
        if !active && self.policy == DeactivationPolicy::ClearDetails {
            return EmergencyStatus {
                active,
                ..EmergencyStatus::default()
            };
        }
        EmergencyStatus { active, ..held }
    }

    pub async fn toggle(&self) {
        let body = self.toggle_request();
        log::info!("Setting emergency mode active={}", body.active);
        let result = self.api.toggle_emergency(&body).await;
        self.apply(result, "Failed to toggle emergency mode");
    }

    /// Sends the whole held status, items included, in one PUT.
    pub async fn update(&self) {
        let body = self.held();
        if body.location.trim().is_empty() || body.description.trim().is_empty() {
            lock(&self.state).action_error = Some(ScreenError::invalid(
                "Location and description are required",
            ));
            return;
        }
        let result = self.api.update_emergency(&body).await;
        self.apply(result, "Failed to update emergency details");
    }

    fn apply(&self, result: crate::Result<EmergencyStatus>, failure: &str) {
        let mut state = lock(&self.state);
        match result {
            Ok(status) => {
                // supersedes any load still in flight
                let ticket = state.status.begin();
                state.status.resolve(ticket, status);
                state.action_error = None;
            }
            Err(e) => {
                log::warn!("{}: {}", failure, e);
                state.action_error = Some(ScreenError::fetch(&e, failure));
            }
        }
    }
}
