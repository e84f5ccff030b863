//! Recording fake of the relief API for screen tests.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::api::ReliefApi;
use crate::api::models::*;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
struct Script {
    emergency: VecDeque<Result<EmergencyStatus>>,
    donation_lists: VecDeque<Result<Vec<Donation>>>,
    donation: VecDeque<Result<Donation>>,
    volunteers: VecDeque<Result<Vec<Volunteer>>>,
    commands: VecDeque<Result<()>>,
}

#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<Call>>,
    script: Mutex<Script>,
    gate: Mutex<Option<Arc<Notify>>>,
}

pub fn donation(id: &str) -> Donation {
    serde_json::from_value(json!({
        "_id": id,
        "foodType": "cooked",
        "quantity": 5,
        "expiryDate": "2024-06-01T00:00:00.000Z",
        "pickupAddress": format!("{id} Pickup Rd"),
        "status": "available",
        "location": { "type": "Point", "coordinates": [77.5, 12.9] }
    }))
    .unwrap()
}

pub fn assigned_donation(id: &str, volunteer: &str) -> Donation {
    let mut d = donation(id);
    d.status = DonationStatus::Assigned;
    d.assigned_to = Some(AssignedVolunteer::Populated {
        id: format!("{volunteer}-id"),
        name: volunteer.to_string(),
    });
    d
}

pub fn volunteer(id: &str) -> Volunteer {
    serde_json::from_value(json!({ "_id": id, "name": format!("Vol {id}"), "vehicle": "bike" }))
        .unwrap()
}

pub fn server_error(status: u16, message: Option<&str>) -> Error {
    Error::api(status, message.map(str::to_string))
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    pub fn push_emergency(&self, r: Result<EmergencyStatus>) {
        self.script.lock().unwrap().emergency.push_back(r);
    }

    pub fn push_donations(&self, r: Result<Vec<Donation>>) {
        self.script.lock().unwrap().donation_lists.push_back(r);
    }

    pub fn push_donation(&self, r: Result<Donation>) {
        self.script.lock().unwrap().donation.push_back(r);
    }

    pub fn push_volunteers(&self, r: Result<Vec<Volunteer>>) {
        self.script.lock().unwrap().volunteers.push_back(r);
    }

    pub fn push_command(&self, r: Result<()>) {
        self.script.lock().unwrap().commands.push_back(r);
    }

    /// Fetches wait on the returned gate until it is notified.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    fn record(&self, method: &'static str, path: impl Into<String>, body: Value) {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.into(),
            body,
        });
    }

    async fn wait_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn next_list(&self) -> Result<Vec<Donation>> {
        self.script
            .lock()
            .unwrap()
            .donation_lists
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn next_command(&self) -> Result<()> {
        self.script.lock().unwrap().commands.pop_front().unwrap_or(Ok(()))
    }

    fn next_emergency(&self, fallback: &EmergencyStatus) -> Result<EmergencyStatus> {
        self.script
            .lock()
            .unwrap()
            .emergency
            .pop_front()
            .unwrap_or_else(|| Ok(fallback.clone()))
    }
}

#[async_trait]
impl ReliefApi for MockApi {
    async fn emergency_status(&self) -> Result<EmergencyStatus> {
        self.record("GET", "/api/emergency/status", Value::Null);
        self.wait_gate().await;
        self.next_emergency(&EmergencyStatus::default())
    }

    async fn toggle_emergency(&self, body: &EmergencyStatus) -> Result<EmergencyStatus> {
        self.record("POST", "/api/emergency/toggle", serde_json::to_value(body).unwrap());
        self.next_emergency(body)
    }

    async fn update_emergency(&self, body: &EmergencyStatus) -> Result<EmergencyStatus> {
        self.record("PUT", "/api/emergency/update", serde_json::to_value(body).unwrap());
        self.next_emergency(body)
    }

    async fn urgent_donations(&self) -> Result<Vec<Donation>> {
        self.record("GET", "/api/donations/urgent", Value::Null);
        self.wait_gate().await;
        self.next_list()
    }

    async fn donations(&self, filter: &DonationFilter) -> Result<Vec<Donation>> {
        let query: Vec<String> = filter
            .query()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        self.record("GET", format!("/api/donations?{}", query.join("&")), Value::Null);
        self.wait_gate().await;
        self.next_list()
    }

    async fn donation(&self, id: &str) -> Result<Donation> {
        self.record("GET", format!("/api/donations/{id}"), Value::Null);
        self.wait_gate().await;
        self.script
            .lock()
            .unwrap()
            .donation
            .pop_front()
            .unwrap_or_else(|| Ok(donation(id)))
    }

    async fn create_donation(&self, body: &NewDonation) -> Result<()> {
        self.record("POST", "/api/donations", serde_json::to_value(body).unwrap());
        self.next_command()
    }

    async fn volunteer_for_donation(&self, id: &str) -> Result<()> {
        self.record("POST", format!("/api/donations/{id}/volunteer"), json!({}));
        self.next_command()
    }

    async fn donation_locations(&self) -> Result<Vec<Donation>> {
        self.record("GET", "/api/donations/locations", Value::Null);
        self.wait_gate().await;
        self.next_list()
    }

    async fn unassigned_donations(&self) -> Result<Vec<Donation>> {
        self.record("GET", "/api/donations/unassigned", Value::Null);
        self.wait_gate().await;
        self.next_list()
    }

    async fn available_volunteers(&self) -> Result<Vec<Volunteer>> {
        self.record("GET", "/api/volunteers/available", Value::Null);
        self.wait_gate().await;
        self.script
            .lock()
            .unwrap()
            .volunteers
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn volunteer_signup(&self, body: &VolunteerSignup) -> Result<()> {
        self.record("POST", "/api/volunteers/signup", serde_json::to_value(body).unwrap());
        self.next_command()
    }

    async fn assign_task(&self, body: &TaskAssignment) -> Result<()> {
        self.record("POST", "/api/tasks/assign", serde_json::to_value(body).unwrap());
        self.next_command()
    }
}
