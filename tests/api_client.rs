//! `ApiClient` against a local fake of the relief API.

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::Json;
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use foodrelief::api::models::*;
use foodrelief::storage::MemoryTokenStore;
use foodrelief::{ApiClient, Error, ReliefApi, Session};

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    uri: String,
    authorization: Option<String>,
    body: Value,
}

#[derive(Default)]
struct Fake {
    seen: Mutex<Vec<Seen>>,
    replies: Mutex<HashMap<String, (StatusCode, Value)>>,
}

impl Fake {
    fn reply(&self, method: &str, path: &str, status: StatusCode, body: Value) {
        self.replies
            .lock()
            .unwrap()
            .insert(format!("{method} {path}"), (status, body));
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

async fn record(
    State(fake): State<Arc<Fake>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let key = format!("{} {}", method, uri.path());
    fake.seen.lock().unwrap().push(Seen {
        method,
        uri: uri.to_string(),
        authorization,
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });
    let reply = fake.replies.lock().unwrap().get(&key).cloned();
    let (status, body) = reply.unwrap_or((StatusCode::OK, json!({})));
    (status, Json(body))
}

async fn serve() -> (Arc<Fake>, String) {
    let fake = Arc::new(Fake::default());
    let app = Router::new().fallback(record).with_state(fake.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (fake, format!("http://{addr}"))
}

fn client(base: &str, token: Option<&str>) -> ApiClient {
    let store = match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::default(),
    };
    let session = Session::restore(Arc::new(store)).unwrap();
    ApiClient::new(base, session, Duration::from_secs(5)).unwrap()
}

fn donation_json(id: &str) -> Value {
    json!({
        "_id": id,
        "foodType": "packaged",
        "quantity": 3,
        "expiryDate": "2024-09-01T00:00:00.000Z",
        "pickupAddress": "1 Depot St",
        "status": "available",
        "location": { "type": "Point", "coordinates": [-0.12, 51.5] },
        "donor": { "name": "Corner Bakery" }
    })
}

#[tokio::test]
async fn filtered_list_sends_query_and_bearer() {
    let (fake, base) = serve().await;
    fake.reply("GET", "/api/donations", StatusCode::OK, json!([donation_json("D1")]));
    let api = client(&base, Some("tok-1"));

    let filter = DonationFilter {
        food_type: Some(FoodType::Fresh),
        urgent_only: true,
    };
    let rows = api.donations(&filter).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "D1");
    assert_eq!(rows[0].donor_name(), "Corner Bakery");

    api.donations(&DonationFilter::default()).await.unwrap();

    let seen = fake.seen();
    assert_eq!(seen[0].method, Method::GET);
    assert_eq!(seen[0].uri, "/api/donations?type=fresh&urgent=true");
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer tok-1"));
    assert_eq!(seen[1].uri, "/api/donations?urgent=false");
}

#[tokio::test]
async fn create_donation_posts_camel_case_body() {
    let (fake, base) = serve().await;
    let api = client(&base, Some("tok"));
    let body = NewDonation {
        food_type: FoodType::Cooked,
        quantity: 2.5,
        expiry_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        pickup_address: "9 Elm Rd".into(),
        description: String::new(),
        is_urgent: true,
    };
    api.create_donation(&body).await.unwrap();

    let seen = fake.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[0].uri, "/api/donations");
    assert_eq!(
        seen[0].body,
        json!({
            "foodType": "cooked",
            "quantity": 2.5,
            "expiryDate": "2024-03-09",
            "pickupAddress": "9 Elm Rd",
            "description": "",
            "isUrgent": true
        })
    );
}

#[tokio::test]
async fn volunteer_command_has_empty_object_body() {
    let (fake, base) = serve().await;
    let api = client(&base, Some("tok"));
    api.volunteer_for_donation("65f0 a").await.unwrap();

    let seen = fake.seen();
    assert_eq!(seen[0].uri, "/api/donations/65f0%20a/volunteer");
    assert_eq!(seen[0].body, json!({}));
}

#[tokio::test]
async fn server_message_is_carried_in_the_error() {
    let (fake, base) = serve().await;
    fake.reply(
        "POST",
        "/api/tasks/assign",
        StatusCode::BAD_REQUEST,
        json!({ "message": "Volunteer is not available" }),
    );
    let api = client(&base, Some("tok"));
    let err = api
        .assign_task(&TaskAssignment {
            donation_id: "D1".into(),
            volunteer_id: "V1".into(),
            note: "fragile".into(),
        })
        .await
        .unwrap_err();

    match &err {
        Error::Api { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message.as_deref(), Some("Volunteer is not available"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        fake.seen()[0].body,
        json!({ "donationId": "D1", "volunteerId": "V1", "note": "fragile" })
    );
}

#[tokio::test]
async fn unauthorized_is_not_retried() {
    let (fake, base) = serve().await;
    fake.reply("GET", "/api/emergency/status", StatusCode::UNAUTHORIZED, json!({}));
    let api = client(&base, Some("expired"));
    let err = api.emergency_status().await.unwrap_err();
    assert_eq!(err.kind(), foodrelief::ErrorKind::Unauthorized);
    assert_eq!(fake.seen().len(), 1);
}

#[tokio::test]
async fn emergency_round_trip_uses_server_response() {
    let (fake, base) = serve().await;
    fake.reply(
        "PUT",
        "/api/emergency/update",
        StatusCode::OK,
        json!({ "active": true, "location": "Ward 4", "description": "Flood", "requiredItems": ["water"] }),
    );
    let api = client(&base, Some("tok"));
    let sent = EmergencyStatus {
        active: true,
        location: "Ward 4".into(),
        description: "Flood".into(),
        required_items: vec!["water".into()],
    };
    let got = api.update_emergency(&sent).await.unwrap();
    assert_eq!(got, sent);

    let seen = fake.seen();
    assert_eq!(seen[0].method, Method::PUT);
    assert_eq!(seen[0].body["requiredItems"], json!(["water"]));
}

#[tokio::test]
async fn both_pools_parse() {
    let (fake, base) = serve().await;
    fake.reply(
        "GET",
        "/api/volunteers/available",
        StatusCode::OK,
        json!([{ "_id": "V1", "name": "Asha", "vehicle": "car", "availability": ["Saturday"] }]),
    );
    let mut assigned = donation_json("D2");
    assigned["assignedTo"] = json!("V9");
    fake.reply("GET", "/api/donations/unassigned", StatusCode::OK, json!([assigned]));
    let api = client(&base, Some("tok"));

    let (volunteers, donations) =
        tokio::try_join!(api.available_volunteers(), api.unassigned_donations()).unwrap();
    assert_eq!(volunteers[0].vehicle, VehicleType::Car);
    assert!(donations[0].assignee().is_some());
}

#[tokio::test]
async fn malformed_body_is_a_json_error() {
    let (fake, base) = serve().await;
    fake.reply("GET", "/api/donations/urgent", StatusCode::OK, json!({ "not": "a list" }));
    let api = client(&base, Some("tok"));
    assert!(matches!(
        api.urgent_donations().await,
        Err(Error::Json(_))
    ));
}

#[tokio::test]
async fn signed_out_client_sends_nothing() {
    let (fake, base) = serve().await;
    let api = client(&base, None);
    assert!(matches!(
        api.donation_locations().await,
        Err(Error::Unauthenticated)
    ));
    assert!(fake.seen().is_empty());
}
