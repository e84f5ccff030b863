use serde::{Deserialize, Serialize};

/// One frame on the push channel: `{"event": "...", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomingEvent {
    #[serde(rename = "event", alias = "type", alias = "event_type")]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    NewUrgentDonation { donation_id: Option<String> },
    TaskAssigned { donation_id: Option<String>, volunteer_id: Option<String> },
    DonationUpdated { donation_id: Option<String> },
    EmergencyChanged { active: Option<bool> },
    Other(String),
}

impl IncomingEvent {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    fn data_str(&self, key: &str) -> Option<String> {
        self.data.get(key).and_then(|v| v.as_str()).map(str::to_string)
    }

    /// Event names are matched loosely; the server has used both
    /// `snake_case` and `camelCase` spellings.
    pub fn classify(&self) -> PushEvent {
        let name: String = self
            .event_type
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match name.as_str() {
            "newurgentdonation" | "urgentdonation" => PushEvent::NewUrgentDonation {
                donation_id: self.data_str("donationId").or_else(|| self.data_str("_id")),
            },
            "taskassigned" => PushEvent::TaskAssigned {
                donation_id: self.data_str("donationId"),
                volunteer_id: self.data_str("volunteerId"),
            },
            "donationupdated" | "donationstatus" => PushEvent::DonationUpdated {
                donation_id: self.data_str("donationId").or_else(|| self.data_str("_id")),
            },
            "emergencytoggled" | "emergencyupdated" | "emergencystatus" => {
                PushEvent::EmergencyChanged {
                    active: self.data.get("active").and_then(|v| v.as_bool()),
                }
            }
            _ => PushEvent::Other(self.event_type.clone()),
        }
    }

    /// Text for the notification list. A `message` in the payload wins.
    pub fn headline(&self) -> String {
        if let Some(message) = self.data_str("message").filter(|m| !m.is_empty()) {
            return message;
        }
        match self.classify() {
            PushEvent::NewUrgentDonation { .. } => "New urgent donation".to_string(),
            PushEvent::TaskAssigned { .. } => "Task assigned".to_string(),
            PushEvent::DonationUpdated { .. } => "Donation updated".to_string(),
            PushEvent::EmergencyChanged { active: Some(true) } => {
                "Emergency mode activated".to_string()
            }
            PushEvent::EmergencyChanged { active: Some(false) } => {
                "Emergency mode deactivated".to_string()
            }
            PushEvent::EmergencyChanged { active: None } => "Emergency status changed".to_string(),
            PushEvent::Other(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_classifies_task_assigned() {
        let ev = IncomingEvent::parse(
            r#"{"event":"task_assigned","data":{"donationId":"D1","volunteerId":"V1"}}"#,
        )
        .unwrap();
        assert_eq!(
            ev.classify(),
            PushEvent::TaskAssigned {
                donation_id: Some("D1".into()),
                volunteer_id: Some("V1".into()),
            }
        );
        assert_eq!(ev.headline(), "Task assigned");
    }

    #[test]
    fn camel_case_names_match() {
        let ev = IncomingEvent::parse(r#"{"type":"newUrgentDonation","data":{"_id":"D7"}}"#).unwrap();
        assert_eq!(
            ev.classify(),
            PushEvent::NewUrgentDonation {
                donation_id: Some("D7".into())
            }
        );
    }

    #[test]
    fn payload_message_is_the_headline() {
        let ev = IncomingEvent::parse(
            r#"{"event":"emergency_toggled","data":{"active":true,"message":"Flooding in Ward 4"}}"#,
        )
        .unwrap();
        assert_eq!(ev.headline(), "Flooding in Ward 4");
        assert_eq!(ev.classify(), PushEvent::EmergencyChanged { active: Some(true) });
    }

    #[test]
    fn unknown_events_keep_their_name() {
        let ev = IncomingEvent::parse(r#"{"event":"chat_message"}"#).unwrap();
        assert_eq!(ev.classify(), PushEvent::Other("chat_message".into()));
        assert_eq!(ev.headline(), "chat_message");
    }
}
