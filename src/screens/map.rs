use std::sync::{Arc, Mutex};
use url::Url;

use super::{SharedApi, lock};
use crate::api::models::Donation;
use crate::error::ScreenError;
use crate::resource::Remote;

pub const DEFAULT_ZOOM: u8 = 13;

const STATIC_MAP_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";
const STATIC_MAP_SIZE: &str = "640x480";

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub donation_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub urgent: bool,
    pub label: String,
}

impl MapMarker {
    /// `None` when the donation has no location.
    pub fn for_donation(donation: &Donation) -> Option<Self> {
        let point = donation.location?;
        Some(Self {
            donation_id: donation.id.clone(),
            latitude: point.latitude(),
            longitude: point.longitude(),
            urgent: donation.is_urgent,
            label: donation.food_type.label().to_string(),
        })
    }
}

#[derive(Debug, Default)]
struct State {
    donations: Remote<Vec<Donation>>,
    user_location: Option<(f64, f64)>,
    selected: Option<String>,
}

/// Donation locations around the user.
#[derive(Clone)]
pub struct MapScreen {
    api: SharedApi,
    maps_api_key: Option<String>,
    state: Arc<Mutex<State>>,
}

impl MapScreen {
    pub fn new(api: SharedApi, maps_api_key: Option<String>) -> Self {
        Self {
            api,
            maps_api_key,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub async fn load(&self) {
        let ticket = lock(&self.state).donations.begin();
        let result = self.api.donation_locations().await;
        let mut state = lock(&self.state);
        match result {
            Ok(rows) => {
                state.donations.resolve(ticket, rows);
            }
            Err(e) => {
                log::warn!("Fetching donation locations failed: {}", e);
                let error = ScreenError::fetch(&e, "Failed to fetch donation locations");
                state.donations.fail(ticket, error);
            }
        }
    }

    pub fn donations(&self) -> Remote<Vec<Donation>> {
        lock(&self.state).donations.clone()
    }

    pub fn set_user_location(&self, latitude: f64, longitude: f64) {
        lock(&self.state).user_location = Some((latitude, longitude));
    }

    pub fn user_location(&self) -> Option<(f64, f64)> {
        lock(&self.state).user_location
    }

    /// `(lat, lng)`; the user's position, else the origin.
    pub fn center(&self) -> (f64, f64) {
        self.user_location().unwrap_or((0.0, 0.0))
    }

    pub fn zoom(&self) -> u8 {
        DEFAULT_ZOOM
    }

    pub fn markers(&self) -> Vec<MapMarker> {
        lock(&self.state)
            .donations
            .data()
            .map(|rows| rows.iter().filter_map(MapMarker::for_donation).collect())
            .unwrap_or_default()
    }

    /// Selecting an id that is not on the map clears the selection.
    pub fn select(&self, donation_id: Option<&str>) {
        let mut state = lock(&self.state);
        let known = donation_id.filter(|id| {
            state
                .donations
                .data()
                .is_some_and(|rows| rows.iter().any(|d| d.id == *id))
        });
        state.selected = known.map(str::to_string);
    }

    pub fn selected(&self) -> Option<Donation> {
        let state = lock(&self.state);
        let id = state.selected.as_deref()?;
        state
            .donations
            .data()
            .and_then(|rows| rows.iter().find(|d| d.id == id))
            .cloned()
    }

    /// Static image of the current view, urgent donations in red. Needs a
    /// maps API key.
    pub fn static_map_url(&self) -> Option<Url> {
        let key = self.maps_api_key.as_deref().filter(|k| !k.is_empty())?;
        let (lat, lng) = self.center();

        let mut params = vec![
            ("center".to_string(), format!("{lat},{lng}")),
            ("zoom".to_string(), DEFAULT_ZOOM.to_string()),
            ("size".to_string(), STATIC_MAP_SIZE.to_string()),
        ];
        if self.user_location().is_some() {
            params.push(("markers".into(), format!("color:blue|{lat},{lng}")));
        }
        for marker in self.markers() {
            let color = if marker.urgent { "red" } else { "green" };
            params.push((
                "markers".into(),
                format!("color:{color}|{},{}", marker.latitude, marker.longitude),
            ));
        }
        params.push(("key".into(), key.to_string()));

        Url::parse_with_params(STATIC_MAP_URL, &params).ok()
    }
}
