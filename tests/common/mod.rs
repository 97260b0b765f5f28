#![allow(dead_code)]

use chrono::NaiveDate;
use plate_check::memory::MemoryStore;
use plate_check::types::{Plate, RegistrationForm, User};
use plate_check::{PlateCheck, Stores};
use std::sync::Arc;
use std::time::Duration;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn plate(id: &str, number: &str, vehicle: &str, expires: NaiveDate) -> Plate {
    Plate {
        plate_id: id.to_string(),
        vehicle_id: vehicle.to_string(),
        plate_number: number.to_string(),
        plate_type: "private".to_string(),
        plate_issue_date: date(2019, 6, 1),
        plate_expiration_date: expires,
        status: "active".to_string(),
    }
}

pub fn form(id: &str, vehicle: &str, client: &str) -> RegistrationForm {
    RegistrationForm {
        registration_id: id.to_string(),
        vehicle_id: vehicle.to_string(),
        lto_client_id: client.to_string(),
        registration_type: "renewal".to_string(),
        status: "approved".to_string(),
        submitted_date: date(2019, 5, 20),
    }
}

pub fn user(client: &str) -> User {
    User {
        lto_client_id: client.to_string(),
        first_name: "Maria".to_string(),
        last_name: "Santos".to_string(),
        email: format!("{}@example.com", client.to_lowercase()),
        contact_number: None,
        role: "client".to_string(),
    }
}

/// NAB 1234 on V1 (valid, R1 owned by C1); ABC 5678 on V2 (expired
/// 2020-01-01, R2 owned by C2); LONE 1 on V3 with no registration form.
pub async fn seeded() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert_plate(plate("P1", "NAB 1234", "V1", date(2099, 12, 31))).await;
    store.insert_plate(plate("P2", "ABC 5678", "V2", date(2020, 1, 1))).await;
    store.insert_plate(plate("P3", "LONE 1", "V3", date(2099, 12, 31))).await;
    store.insert_registration_form(form("R1", "V1", "C1")).await;
    store.insert_registration_form(form("R2", "V2", "C2")).await;
    store.insert_user(user("C1")).await;
    store.insert_user(user("C2")).await;
    store
}

pub fn service(store: Arc<MemoryStore>, cycle_timeout: Duration) -> Arc<PlateCheck> {
    Arc::new(PlateCheck::new(Stores::shared(store), cycle_timeout))
}
