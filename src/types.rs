use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Inbound query. `timestamp` is accepted from the client but not consulted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlateCheckRequest {
    pub plate: String,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Valid,
    NotFound,
    Expired,
    Error,
    BadRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateCheckResponse {
    /// Echo of the queried plate; absent only on `bad_request`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<DetailPack>,
}

impl PlateCheckResponse {
    pub fn bad_request() -> Self {
        PlateCheckResponse {
            plate: None,
            status: Status::BadRequest,
            details: None,
        }
    }
}

/// Best-effort enrichment attached to a found plate. Each field is present
/// only if its own lookup succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailPack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_form: Option<RegistrationForm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plates: Option<Vec<Plate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_record: Option<User>,
}

impl DetailPack {
    pub fn is_empty(&self) -> bool {
        self.registration_form.is_none() && self.plates.is_none() && self.user_record.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    pub plate_id: String,
    pub vehicle_id: String,
    pub plate_number: String,
    pub plate_type: String,
    pub plate_issue_date: NaiveDate,
    pub plate_expiration_date: NaiveDate,
    pub status: String,
}

impl Plate {
    /// A plate is expired once midnight UTC of its expiration date has passed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        Utc.from_utc_datetime(&self.plate_expiration_date.and_time(NaiveTime::MIN)) < now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub registration_id: String,
    pub vehicle_id: String,
    pub lto_client_id: String,
    pub registration_type: String,
    pub status: String,
    pub submitted_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub lto_client_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    pub role: String,
}

/// Append-only audit fact. The log id is assigned by the audit store.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanLogEntry {
    pub plate_id: String,
    pub registration_id: String,
    pub lto_client_id: String,
    pub scanned_at: DateTime<Utc>,
}
