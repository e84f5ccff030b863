//! One controller per screen.
//!
//! A controller owns the screen's view state behind a mutex and exposes the
//! user actions as methods. Controllers are cheap to clone; the GTK layer
//! spawns their async actions inside the view's [`ViewScope`] and re-renders
//! from a snapshot when an action completes.
//!
//! [`ViewScope`]: crate::scope::ViewScope

pub mod donation_detail;
pub mod donation_form;
pub mod donation_list;
pub mod emergency;
pub mod map;
pub mod task_assignment;
pub mod volunteer_signup;

use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::ReliefApi;

pub use donation_detail::{DonationDetailScreen, VolunteerOutcome};
pub use donation_form::{DonationDraft, DonationFormScreen};
pub use donation_list::{DonationListScreen, ListSource};
pub use emergency::EmergencyScreen;
pub use map::{MapMarker, MapScreen};
pub use task_assignment::{AssignmentBoard, TaskAssignmentScreen};
pub use volunteer_signup::{SignupDraft, VolunteerSignupScreen};

pub type SharedApi = Arc<dyn ReliefApi>;

/// Screen state stays usable after a panic elsewhere.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
pub(crate) async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
