use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client as HttpClient;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::ReliefApi;
use crate::api::models::{
    ApiErrorBody, Donation, DonationFilter, EmergencyStatus, NewDonation, TaskAssignment,
    Volunteer, VolunteerSignup,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::utils::normalize_url;

#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_api: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_api: Self::base_api(&normalize_url(base_url)),
            session,
        })
    }

    pub fn from_config(config: &Config, session: Session) -> Result<Self> {
        Self::new(&config.api_base_url, session, config.request_timeout)
    }

    fn base_api(base_url: &str) -> String {
        let trimmed = base_url.trim_end_matches('/');
        if trimmed.ends_with("/api") {
            trimmed.to_string()
        } else {
            format!("{}/api", trimmed)
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_api, path)
    }

    /// Every endpoint is authenticated; without a credential nothing is sent.
    fn with_auth(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.session.token().ok_or(Error::Unauthenticated)?;
        let value =
            HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| Error::InvalidToken)?;
        Ok(req.header(AUTHORIZATION, value))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        self.with_auth(self.http.request(method, self.url(path)))
    }

    async fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        debug!("API error response ({}): {}", status, body);
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);
        Err(Error::api(status.as_u16(), message))
    }

    async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let resp = Self::check(resp).await?;
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            log::error!("Failed to parse API response: {}", e);
            Error::Json(e)
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {}", path);
        let resp = self.request(Method::GET, path)?.send().await?;
        Self::read_json(resp).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!("{} {}", method, path);
        let resp = self.request(method, path)?.json(body).send().await?;
        Self::read_json(resp).await
    }

    /// For commands whose response body is not used.
    async fn command<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        debug!("POST {}", path);
        let resp = self.request(Method::POST, path)?.json(body).send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl ReliefApi for ApiClient {
    async fn emergency_status(&self) -> Result<EmergencyStatus> {
        self.get("/emergency/status").await
    }

    async fn toggle_emergency(&self, body: &EmergencyStatus) -> Result<EmergencyStatus> {
        self.send_json(Method::POST, "/emergency/toggle", body).await
    }

    async fn update_emergency(&self, body: &EmergencyStatus) -> Result<EmergencyStatus> {
        self.send_json(Method::PUT, "/emergency/update", body).await
    }

    async fn urgent_donations(&self) -> Result<Vec<Donation>> {
        self.get("/donations/urgent").await
    }

    async fn donations(&self, filter: &DonationFilter) -> Result<Vec<Donation>> {
        debug!("GET /donations {:?}", filter);
        let resp = self
            .request(Method::GET, "/donations")?
            .query(&filter.query())
            .send()
            .await?;
        Self::read_json(resp).await
    }

    async fn donation(&self, id: &str) -> Result<Donation> {
        self.get(&format!("/donations/{}", urlencode(id))).await
    }

    async fn create_donation(&self, body: &NewDonation) -> Result<()> {
        self.command("/donations", body).await
    }

    async fn volunteer_for_donation(&self, id: &str) -> Result<()> {
        self.command(
            &format!("/donations/{}/volunteer", urlencode(id)),
            &serde_json::json!({}),
        )
        .await
    }

    async fn donation_locations(&self) -> Result<Vec<Donation>> {
        self.get("/donations/locations").await
    }

    async fn unassigned_donations(&self) -> Result<Vec<Donation>> {
        self.get("/donations/unassigned").await
    }

    async fn available_volunteers(&self) -> Result<Vec<Volunteer>> {
        self.get("/volunteers/available").await
    }

    async fn volunteer_signup(&self, body: &VolunteerSignup) -> Result<()> {
        self.command("/volunteers/signup", body).await
    }

    async fn assign_task(&self, body: &TaskAssignment) -> Result<()> {
        self.command("/tasks/assign", body).await
    }
}

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Ids come from the server, but a route can carry anything.
fn urlencode(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}
