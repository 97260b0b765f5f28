use crate::memory::MemoryStore;
use crate::types::{Plate, RegistrationForm, User};
use chrono::NaiveDate;
use std::sync::Arc;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn plate(id: &str, number: &str, vehicle: &str, expires: NaiveDate) -> Plate {
    Plate {
        plate_id: id.to_string(),
        vehicle_id: vehicle.to_string(),
        plate_number: number.to_string(),
        plate_type: "private".to_string(),
        plate_issue_date: date(2019, 1, 1),
        plate_expiration_date: expires,
        status: "active".to_string(),
    }
}

pub fn form(id: &str, vehicle: &str, client: &str) -> RegistrationForm {
    RegistrationForm {
        registration_id: id.to_string(),
        vehicle_id: vehicle.to_string(),
        lto_client_id: client.to_string(),
        registration_type: "new".to_string(),
        status: "approved".to_string(),
        submitted_date: date(2019, 1, 1),
    }
}

pub fn user(client: &str) -> User {
    User {
        lto_client_id: client.to_string(),
        first_name: "Juan".to_string(),
        last_name: "Dela Cruz".to_string(),
        email: format!("{}@example.com", client.to_lowercase()),
        contact_number: Some("09171234567".to_string()),
        role: "client".to_string(),
    }
}

/// NAB 1234 and NAB 9999 on V1 (valid, owner C1); ABC 5678 on V2 (expired
/// 2020-01-01, owner C2).
pub async fn seeded() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert_plate(plate("P1", "NAB 1234", "V1", date(2099, 1, 1))).await;
    store.insert_plate(plate("P2", "NAB 9999", "V1", date(2099, 1, 1))).await;
    store.insert_plate(plate("P3", "ABC 5678", "V2", date(2020, 1, 1))).await;
    store.insert_registration_form(form("R1", "V1", "C1")).await;
    store.insert_registration_form(form("R2", "V2", "C2")).await;
    store.insert_user(user("C1")).await;
    store.insert_user(user("C2")).await;
    store
}
