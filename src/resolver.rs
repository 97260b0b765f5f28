//! Plate resolution: classify a plate number against the plate store, then
//! gather whatever enrichment the other stores can provide.

use crate::metrics::Metrics;
use crate::store::{bounded, StoreError, Stores};
use crate::types::{DetailPack, Plate, PlateCheckResponse, Status};
use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use tokio::time::Instant;

/// Outcome of resolving one plate number. `record` is kept alongside the
/// details because the scan logger needs the plate id.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub plate: String,
    pub status: Status,
    pub record: Option<Plate>,
    pub details: Option<DetailPack>,
}

impl Resolution {
    pub fn into_response(self) -> PlateCheckResponse {
        PlateCheckResponse {
            plate: Some(self.plate),
            status: self.status,
            details: self.details,
        }
    }
}

pub fn classify(lookup: &Result<Option<Plate>, StoreError>, now: DateTime<Utc>) -> Status {
    match lookup {
        Err(_) => Status::Error,
        Ok(None) => Status::NotFound,
        Ok(Some(plate)) if plate.is_expired_at(now) => Status::Expired,
        Ok(Some(_)) => Status::Valid,
    }
}

pub async fn resolve(
    stores: &Stores,
    metrics: &Metrics,
    number: &str,
    now: DateTime<Utc>,
    deadline: Instant,
) -> Resolution {
    let lookup = bounded(deadline, stores.plates.find_plate_by_number(number)).await;
    let status = classify(&lookup, now);
    debug!("Plate {:?} classified as {:?}", number, status);

    let record = match lookup {
        Ok(record) => record,
        Err(e) => {
            error!("Plate lookup failed for {:?}: {}", number, e);
            metrics.lookup_error();
            if let StoreError::DeadlineElapsed = e {
                metrics.deadline_elapsed();
            }
            None
        }
    };

    let details = match &record {
        Some(plate) => Some(enrich(stores, metrics, plate, deadline).await),
        None => None,
    };

    Resolution {
        plate: number.to_string(),
        status,
        record,
        details,
    }
}

/// Each lookup stands alone; a failure drops only its own field. The owner
/// lookup needs the form's client id, so it runs only if the form resolved.
async fn enrich(stores: &Stores, metrics: &Metrics, plate: &Plate, deadline: Instant) -> DetailPack {
    let vehicle_id = plate.vehicle_id.as_str();

    let registration_form = optional(
        metrics,
        "registration form",
        vehicle_id,
        bounded(
            deadline,
            stores.registrations.find_registration_form_by_vehicle(vehicle_id),
        )
        .await,
    )
    .flatten();

    let plates = optional(
        metrics,
        "vehicle plates",
        vehicle_id,
        bounded(deadline, stores.plates.list_plates_by_vehicle(vehicle_id)).await,
    )
    .filter(|plates| !plates.is_empty());

    let user_record = match &registration_form {
        Some(form) => optional(
            metrics,
            "owner",
            &form.lto_client_id,
            bounded(deadline, stores.users.find_user_by_client_id(&form.lto_client_id)).await,
        ),
        None => None,
    };

    DetailPack {
        registration_form,
        plates,
        user_record,
    }
}

fn optional<T>(metrics: &Metrics, what: &str, key: &str, result: Result<T, StoreError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(StoreError::NotFound { .. }) => None,
        Err(e) => {
            warn!("Omitting {} for {}: {}", what, key, e);
            metrics.enrichment_error();
            if let StoreError::DeadlineElapsed = e {
                metrics.deadline_elapsed();
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryStore, Seam};
    use crate::testutil::{date, form, plate, seeded, user};
    use std::sync::Arc;
    use std::time::Duration;

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(5)
    }

    async fn run(store: Arc<MemoryStore>, number: &str) -> (Resolution, Metrics) {
        let metrics = Metrics::default();
        let stores = Stores::shared(store);
        let resolution = resolve(&stores, &metrics, number, Utc::now(), far_deadline()).await;
        (resolution, metrics)
    }

    #[test]
    fn classification_covers_every_outcome() {
        let now = Utc::now();
        let expired = plate("P1", "OLD 1", "V1", date(2020, 1, 1));
        let valid = plate("P2", "NEW 1", "V1", date(2099, 1, 1));
        assert_eq!(classify(&Err(StoreError::DeadlineElapsed), now), Status::Error);
        assert_eq!(classify(&Ok(None), now), Status::NotFound);
        assert_eq!(classify(&Ok(Some(expired)), now), Status::Expired);
        assert_eq!(classify(&Ok(Some(valid)), now), Status::Valid);
    }

    #[test]
    fn expiration_boundary_is_midnight_utc() {
        let p = plate("P1", "EDGE 1", "V1", date(2024, 6, 1));
        let midnight = "2024-06-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let later = "2024-06-01T00:00:01Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(classify(&Ok(Some(p.clone())), midnight), Status::Valid);
        assert_eq!(classify(&Ok(Some(p)), later), Status::Expired);
    }

    #[tokio::test]
    async fn unknown_plate_has_no_details() {
        let (resolution, _) = run(seeded().await, "ZZZ 0000").await;
        assert_eq!(resolution.status, Status::NotFound);
        assert!(resolution.record.is_none());
        assert!(resolution.details.is_none());
    }

    #[tokio::test]
    async fn valid_plate_gets_full_details() {
        let (resolution, metrics) = run(seeded().await, "NAB 1234").await;
        assert_eq!(resolution.status, Status::Valid);
        let details = resolution.details.unwrap();
        assert_eq!(details.registration_form.unwrap().registration_id, "R1");
        assert_eq!(details.plates.unwrap().len(), 2);
        assert_eq!(details.user_record.unwrap().lto_client_id, "C1");
        assert_eq!(metrics.snapshot().enrichment_errors, 0);
    }

    #[tokio::test]
    async fn expired_plate_still_enriched() {
        let (resolution, _) = run(seeded().await, "ABC 5678").await;
        assert_eq!(resolution.status, Status::Expired);
        let details = resolution.details.unwrap();
        assert_eq!(details.registration_form.unwrap().registration_id, "R2");
        assert!(details.user_record.is_some());
    }

    #[tokio::test]
    async fn primary_failure_degrades_to_error() {
        let store = seeded().await;
        store.fail(Seam::FindPlate).await;
        let (resolution, metrics) = run(store, "NAB 1234").await;
        assert_eq!(resolution.status, Status::Error);
        assert!(resolution.details.is_none());
        assert_eq!(metrics.snapshot().lookup_errors, 1);
    }

    #[tokio::test]
    async fn missing_form_skips_owner_lookup() {
        let store = Arc::new(MemoryStore::new());
        store.insert_plate(plate("P9", "LONE 1", "V9", date(2099, 1, 1))).await;
        store.insert_user(user("C9")).await;
        let (resolution, _) = run(store, "LONE 1").await;
        assert_eq!(resolution.status, Status::Valid);
        let details = resolution.details.unwrap();
        assert!(details.registration_form.is_none());
        assert!(details.user_record.is_none());
        assert_eq!(details.plates.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn enrichment_failures_only_drop_their_field() {
        let store = seeded().await;
        store.fail(Seam::ListPlates).await;
        store.fail(Seam::FindUser).await;
        let (resolution, metrics) = run(store, "NAB 1234").await;
        assert_eq!(resolution.status, Status::Valid);
        let details = resolution.details.unwrap();
        assert!(details.registration_form.is_some());
        assert!(details.plates.is_none());
        assert!(details.user_record.is_none());
        assert_eq!(metrics.snapshot().enrichment_errors, 2);
    }

    #[tokio::test]
    async fn absent_owner_is_not_an_error() {
        let store = Arc::new(MemoryStore::new());
        store.insert_plate(plate("P7", "ORPH 7", "V7", date(2099, 1, 1))).await;
        store.insert_registration_form(form("R7", "V7", "C404")).await;
        let (resolution, metrics) = run(store, "ORPH 7").await;
        let details = resolution.details.unwrap();
        assert!(details.registration_form.is_some());
        assert!(details.user_record.is_none());
        assert_eq!(metrics.snapshot().enrichment_errors, 0);
    }

    #[tokio::test]
    async fn elapsed_deadline_on_primary_lookup() {
        let store = seeded().await;
        store.stall(Seam::FindPlate, Duration::from_millis(300)).await;
        let metrics = Metrics::default();
        let stores = Stores::shared(store);
        let deadline = Instant::now() + Duration::from_millis(20);
        let resolution = resolve(&stores, &metrics, "NAB 1234", Utc::now(), deadline).await;
        assert_eq!(resolution.status, Status::Error);
        assert!(resolution.details.is_none());
        assert_eq!(metrics.snapshot().deadline_elapsed, 1);
    }
}
