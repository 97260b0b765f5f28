//! Data access seams consumed by the plate check pipeline.
//!
//! Every collaborator is a trait object so the pipeline can be wired against
//! SQLite in production and an in-memory store in tests.

use crate::types::{Plate, RegistrationForm, ScanLogEntry, User};
use async_trait::async_trait;
use failure::Fail;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{timeout_at, Instant};

#[derive(Debug, Fail)]
pub enum StoreError {
    #[fail(display = "database error: {}", _0)]
    Database(#[fail(cause)] rusqlite::Error),
    #[fail(display = "{} not found: {}", kind, key)]
    NotFound { kind: &'static str, key: String },
    #[fail(display = "store unavailable: {}", _0)]
    Unavailable(String),
    #[fail(display = "deadline elapsed")]
    DeadlineElapsed,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e)
    }
}

#[async_trait]
pub trait PlateStore: Send + Sync {
    /// Exact match on the plate number; no case folding or trimming.
    async fn find_plate_by_number(&self, number: &str) -> Result<Option<Plate>, StoreError>;

    async fn list_plates_by_vehicle(&self, vehicle_id: &str) -> Result<Vec<Plate>, StoreError>;
}

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn find_registration_form_by_vehicle(
        &self,
        vehicle_id: &str,
    ) -> Result<Option<RegistrationForm>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Absence is reported as `StoreError::NotFound`.
    async fn find_user_by_client_id(&self, client_id: &str) -> Result<User, StoreError>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Appends the entry and returns the generated log id.
    async fn append_scan_log(&self, entry: &ScanLogEntry) -> Result<String, StoreError>;
}

/// The collaborator set handed to the pipeline at construction.
#[derive(Clone)]
pub struct Stores {
    pub plates: Arc<dyn PlateStore>,
    pub registrations: Arc<dyn RegistrationStore>,
    pub users: Arc<dyn UserStore>,
    pub audit: Arc<dyn AuditStore>,
}

impl Stores {
    /// Wires every seam to the same backing store.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: PlateStore + RegistrationStore + UserStore + AuditStore + 'static,
    {
        Stores {
            plates: store.clone(),
            registrations: store.clone(),
            users: store.clone(),
            audit: store,
        }
    }
}

/// Runs a store call, giving up with `DeadlineElapsed` once `deadline` passes.
pub async fn bounded<T, F>(deadline: Instant, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match timeout_at(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::DeadlineElapsed),
    }
}
