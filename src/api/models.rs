use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FoodType {
    Cooked,
    Packaged,
    Fresh,
    Grains,
    /// Anything the server sends that this client does not know. Never
    /// offered as a choice.
    #[default]
    #[serde(other)]
    Unknown,
}

impl FoodType {
    pub const ALL: [FoodType; 4] = [
        FoodType::Cooked,
        FoodType::Packaged,
        FoodType::Fresh,
        FoodType::Grains,
    ];

    /// Wire value, also used as the `type` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            FoodType::Cooked => "cooked",
            FoodType::Packaged => "packaged",
            FoodType::Fresh => "fresh",
            FoodType::Grains => "grains",
            FoodType::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FoodType::Cooked => "Cooked Food",
            FoodType::Packaged => "Packaged Food",
            FoodType::Fresh => "Fresh Produce",
            FoodType::Grains => "Grains",
            FoodType::Unknown => "Other",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    #[default]
    Available,
    Assigned,
    Completed,
    #[serde(other)]
    Unknown,
}

impl DonationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DonationStatus::Available => "available",
            DonationStatus::Assigned => "assigned",
            DonationStatus::Completed => "completed",
            DonationStatus::Unknown => "unknown",
        }
    }
}

/// GeoJSON point. Coordinates are `[longitude, latitude]`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DonorRef {
    #[serde(default)]
    pub name: String,
}

/// `assignedTo` arrives either populated or as a bare id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum AssignedVolunteer {
    Populated {
        #[serde(rename = "_id", alias = "id", default)]
        id: String,
        #[serde(default)]
        name: String,
    },
    Id(String),
}

impl AssignedVolunteer {
    pub fn display_name(&self) -> &str {
        match self {
            AssignedVolunteer::Populated { name, id } if name.is_empty() => id,
            AssignedVolunteer::Populated { name, .. } => name,
            AssignedVolunteer::Id(id) => id,
        }
    }

    fn is_present(&self) -> bool {
        match self {
            AssignedVolunteer::Populated { id, name } => !id.is_empty() || !name.is_empty(),
            AssignedVolunteer::Id(id) => !id.is_empty(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub food_type: FoodType,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: f64,
    /// Kept as sent; the server emits ISO timestamps.
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub pickup_address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(default)]
    pub status: DonationStatus,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub assigned_to: Option<AssignedVolunteer>,
    #[serde(default)]
    pub donor: Option<DonorRef>,
}

/// Quantities arrive as numbers, or as the form's string value from older
/// clients. Anything else reads as zero rather than failing the whole list.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(text) => text.trim().parse().unwrap_or(0.0),
        Raw::Other(_) => 0.0,
    })
}

impl Donation {
    pub fn expiry(&self) -> Option<NaiveDate> {
        let date = self.expiry_date.get(..10)?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }

    pub fn expiry_display(&self) -> String {
        self.expiry()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| self.expiry_date.clone())
    }

    pub fn assignee(&self) -> Option<&AssignedVolunteer> {
        self.assigned_to.as_ref().filter(|a| a.is_present())
    }

    pub fn donor_name(&self) -> &str {
        self.donor.as_ref().map(|d| d.name.as_str()).unwrap_or("")
    }

    /// One-line summary used by selectors.
    pub fn summary(&self) -> String {
        format!(
            "{} - {} - {}",
            self.food_type.as_str(),
            self.quantity,
            self.pickup_address
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    pub food_type: FoodType,
    pub quantity: f64,
    pub expiry_date: NaiveDate,
    pub pickup_address: String,
    pub description: String,
    pub is_urgent: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationFilter {
    pub food_type: Option<FoodType>,
    pub urgent_only: bool,
}

impl DonationFilter {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(2);
        if let Some(t) = self.food_type {
            params.push(("type", t.as_str().to_string()));
        }
        params.push(("urgent", self.urgent_only.to_string()));
        params
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Car,
    Bike,
    Scooter,
    #[default]
    None,
}

impl VehicleType {
    pub const ALL: [VehicleType; 4] = [
        VehicleType::Car,
        VehicleType::Bike,
        VehicleType::Scooter,
        VehicleType::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Bike => "bike",
            VehicleType::Scooter => "scooter",
            VehicleType::None => "none",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleType::Car => "Car",
            VehicleType::Bike => "Bike",
            VehicleType::Scooter => "Scooter",
            VehicleType::None => "No Vehicle",
        }
    }
}

/// Fixed availability labels offered at signup.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeSlot {
    #[serde(rename = "Monday Morning")]
    MondayMorning,
    #[serde(rename = "Monday Evening")]
    MondayEvening,
    #[serde(rename = "Tuesday Morning")]
    TuesdayMorning,
    #[serde(rename = "Tuesday Evening")]
    TuesdayEvening,
    #[serde(rename = "Wednesday Morning")]
    WednesdayMorning,
    #[serde(rename = "Wednesday Evening")]
    WednesdayEvening,
    #[serde(rename = "Thursday Morning")]
    ThursdayMorning,
    #[serde(rename = "Thursday Evening")]
    ThursdayEvening,
    #[serde(rename = "Friday Morning")]
    FridayMorning,
    #[serde(rename = "Friday Evening")]
    FridayEvening,
    Saturday,
    Sunday,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 12] = [
        TimeSlot::MondayMorning,
        TimeSlot::MondayEvening,
        TimeSlot::TuesdayMorning,
        TimeSlot::TuesdayEvening,
        TimeSlot::WednesdayMorning,
        TimeSlot::WednesdayEvening,
        TimeSlot::ThursdayMorning,
        TimeSlot::ThursdayEvening,
        TimeSlot::FridayMorning,
        TimeSlot::FridayEvening,
        TimeSlot::Saturday,
        TimeSlot::Sunday,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::MondayMorning => "Monday Morning",
            TimeSlot::MondayEvening => "Monday Evening",
            TimeSlot::TuesdayMorning => "Tuesday Morning",
            TimeSlot::TuesdayEvening => "Tuesday Evening",
            TimeSlot::WednesdayMorning => "Wednesday Morning",
            TimeSlot::WednesdayEvening => "Wednesday Evening",
            TimeSlot::ThursdayMorning => "Thursday Morning",
            TimeSlot::ThursdayEvening => "Thursday Evening",
            TimeSlot::FridayMorning => "Friday Morning",
            TimeSlot::FridayEvening => "Friday Evening",
            TimeSlot::Saturday => "Saturday",
            TimeSlot::Sunday => "Sunday",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default)]
    pub vehicle: VehicleType,
    #[serde(default)]
    pub area: String,
    /// Labels as stored server-side; not narrowed to `TimeSlot`.
    #[serde(default)]
    pub availability: Vec<String>,
    #[serde(default)]
    pub experience: String,
}

impl Volunteer {
    pub fn summary(&self) -> String {
        format!("{} - {} - {}", self.name, self.area, self.vehicle.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerSignup {
    pub availability: Vec<TimeSlot>,
    pub vehicle: VehicleType,
    pub area: String,
    pub experience: String,
    pub phone_number: String,
    pub emergency_contact: String,
}

/// Also the body of the toggle and update commands.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyStatus {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_items: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    pub donation_id: String,
    pub volunteer_id: String,
    pub note: String,
}

/// Error body shape; only `message` is read.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn donation_from_server_json() {
        let raw = json!({
            "_id": "D1",
            "foodType": "cooked",
            "quantity": 12,
            "expiryDate": "2024-06-01T00:00:00.000Z",
            "pickupAddress": "1 Main St",
            "description": "rice",
            "isUrgent": true,
            "status": "available",
            "location": { "type": "Point", "coordinates": [77.59, 12.97] },
            "donor": { "name": "Asha" }
        });
        let d: Donation = serde_json::from_value(raw).unwrap();
        assert_eq!(d.id, "D1");
        assert_eq!(d.food_type, FoodType::Cooked);
        assert_eq!(d.expiry(), NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(d.location.unwrap().latitude(), 12.97);
        assert_eq!(d.donor_name(), "Asha");
        assert!(d.assignee().is_none());
    }

    #[test]
    fn assigned_to_accepts_id_or_object() {
        let base = json!({
            "_id": "D2", "foodType": "fresh", "quantity": 1,
            "expiryDate": "2024-06-01", "pickupAddress": "x"
        });

        let mut populated = base.clone();
        populated["assignedTo"] = json!({ "_id": "V1", "name": "Ravi" });
        let d: Donation = serde_json::from_value(populated).unwrap();
        assert_eq!(d.assignee().unwrap().display_name(), "Ravi");

        let mut bare = base.clone();
        bare["assignedTo"] = json!("V9");
        let d: Donation = serde_json::from_value(bare).unwrap();
        assert_eq!(d.assignee().unwrap().display_name(), "V9");

        let mut null = base;
        null["assignedTo"] = serde_json::Value::Null;
        let d: Donation = serde_json::from_value(null).unwrap();
        assert!(d.assignee().is_none());
    }

    #[test]
    fn narrow_location_rows_still_parse() {
        let rows: Vec<Donation> = serde_json::from_value(json!([
            {
                "_id": "D4", "foodType": "fresh", "quantity": 3, "isUrgent": true,
                "location": { "type": "Point", "coordinates": [77.5, 12.9] }
            },
            { "_id": "D5", "foodType": "cooked", "quantity": 1, "expiryDate": "2024-06-01",
              "pickupAddress": "z" }
        ]))
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].pickup_address, "");
        assert_eq!(rows[0].expiry_date, "");
        assert!(rows[0].location.is_some());
    }

    #[test]
    fn unknown_food_type_does_not_fail_the_list() {
        let rows: Vec<Donation> = serde_json::from_value(json!([
            { "_id": "D6", "foodType": "dairy", "quantity": 2, "pickupAddress": "a" },
            { "_id": "D7", "foodType": "grains", "quantity": 2, "pickupAddress": "b" }
        ]))
        .unwrap();
        assert_eq!(rows[0].food_type, FoodType::Unknown);
        assert_eq!(rows[0].food_type.label(), "Other");
        assert_eq!(rows[1].food_type, FoodType::Grains);
        assert!(!FoodType::ALL.contains(&FoodType::Unknown));
    }

    #[test]
    fn quantity_may_arrive_as_text() {
        let rows: Vec<Donation> = serde_json::from_value(json!([
            { "_id": "D8", "foodType": "cooked", "quantity": "12" },
            { "_id": "D9", "foodType": "cooked", "quantity": " 2.5 " },
            { "_id": "D10", "foodType": "cooked", "quantity": "a dozen" },
            { "_id": "D11", "foodType": "cooked", "quantity": null },
            { "_id": "D12", "foodType": "cooked" }
        ]))
        .unwrap();
        let quantities: Vec<f64> = rows.iter().map(|d| d.quantity).collect();
        assert_eq!(quantities, vec![12.0, 2.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn unknown_status_does_not_fail() {
        let d: Donation = serde_json::from_value(json!({
            "_id": "D3", "foodType": "grains", "quantity": 2.5,
            "expiryDate": "soon", "pickupAddress": "y", "status": "expired"
        }))
        .unwrap();
        assert_eq!(d.status, DonationStatus::Unknown);
        assert_eq!(d.expiry_display(), "soon");
    }

    #[test]
    fn new_donation_wire_shape() {
        let body = NewDonation {
            food_type: FoodType::Packaged,
            quantity: 4.0,
            expiry_date: NaiveDate::from_ymd_opt(2024, 7, 9).unwrap(),
            pickup_address: "2 High St".into(),
            description: String::new(),
            is_urgent: false,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "foodType": "packaged",
                "quantity": 4.0,
                "expiryDate": "2024-07-09",
                "pickupAddress": "2 High St",
                "description": "",
                "isUrgent": false
            })
        );
    }

    #[test]
    fn filter_query_omits_all_types() {
        let all = DonationFilter::default();
        assert_eq!(all.query(), vec![("urgent", "false".to_string())]);

        let fresh_urgent = DonationFilter {
            food_type: Some(FoodType::Fresh),
            urgent_only: true,
        };
        assert_eq!(
            fresh_urgent.query(),
            vec![("type", "fresh".to_string()), ("urgent", "true".to_string())]
        );
    }

    #[test]
    fn signup_uses_slot_labels() {
        let body = VolunteerSignup {
            availability: vec![TimeSlot::MondayMorning, TimeSlot::Sunday],
            vehicle: VehicleType::Bike,
            area: "North".into(),
            experience: String::new(),
            phone_number: "555".into(),
            emergency_contact: "556".into(),
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["availability"], json!(["Monday Morning", "Sunday"]));
        assert_eq!(v["vehicle"], json!("bike"));
        assert_eq!(v["phoneNumber"], json!("555"));
    }
}
