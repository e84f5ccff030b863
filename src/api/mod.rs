pub mod client;
pub mod events;
pub mod models;

use async_trait::async_trait;

use crate::error::Result;
use models::{
    Donation, DonationFilter, EmergencyStatus, NewDonation, TaskAssignment, Volunteer,
    VolunteerSignup,
};

pub use client::ApiClient;

/// Everything the screens ask of the relief API. `ApiClient` is the HTTP
/// implementation; tests substitute a recording fake.
#[async_trait]
pub trait ReliefApi: Send + Sync {
    /// GET /api/emergency/status
    async fn emergency_status(&self) -> Result<EmergencyStatus>;
    /// POST /api/emergency/toggle
    async fn toggle_emergency(&self, body: &EmergencyStatus) -> Result<EmergencyStatus>;
    /// PUT /api/emergency/update
    async fn update_emergency(&self, body: &EmergencyStatus) -> Result<EmergencyStatus>;

    /// GET /api/donations/urgent
    async fn urgent_donations(&self) -> Result<Vec<Donation>>;
    /// GET /api/donations?type=&urgent=
    async fn donations(&self, filter: &DonationFilter) -> Result<Vec<Donation>>;
    /// GET /api/donations/:id
    async fn donation(&self, id: &str) -> Result<Donation>;
    /// POST /api/donations
    async fn create_donation(&self, body: &NewDonation) -> Result<()>;
    /// POST /api/donations/:id/volunteer with an empty body
    async fn volunteer_for_donation(&self, id: &str) -> Result<()>;
    /// GET /api/donations/locations
    async fn donation_locations(&self) -> Result<Vec<Donation>>;
    /// GET /api/donations/unassigned
    async fn unassigned_donations(&self) -> Result<Vec<Donation>>;

    /// GET /api/volunteers/available
    async fn available_volunteers(&self) -> Result<Vec<Volunteer>>;
    /// POST /api/volunteers/signup
    async fn volunteer_signup(&self, body: &VolunteerSignup) -> Result<()>;

    /// POST /api/tasks/assign
    async fn assign_task(&self, body: &TaskAssignment) -> Result<()>;
}
