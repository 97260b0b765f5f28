//! In-memory store
//!
//! Implements every store seam over hashmaps. Individual seams can be made to
//! fail or to stall, which is how the pipeline's degradation paths are
//! exercised without a database.

use crate::store::{AuditStore, PlateStore, RegistrationStore, StoreError, UserStore};
use crate::types::{Plate, RegistrationForm, ScanLogEntry, User};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A single collaborator call, used to target injected faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seam {
    FindPlate,
    ListPlates,
    FindRegistration,
    FindUser,
    AppendScanLog,
}

#[derive(Default)]
pub struct MemoryStore {
    plates: RwLock<Vec<Plate>>,
    forms: RwLock<HashMap<String, RegistrationForm>>,
    users: RwLock<HashMap<String, User>>,
    scan_logs: RwLock<Vec<(String, ScanLogEntry)>>,
    failing: RwLock<HashSet<Seam>>,
    stalled: RwLock<HashMap<Seam, Duration>>,
    stalled_plates: RwLock<HashMap<String, Duration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_plate(&self, plate: Plate) {
        self.plates.write().await.push(plate);
    }

    /// Forms are keyed by vehicle; a later insert replaces the earlier one.
    pub async fn insert_registration_form(&self, form: RegistrationForm) {
        self.forms.write().await.insert(form.vehicle_id.clone(), form);
    }

    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.lto_client_id.clone(), user);
    }

    pub async fn fail(&self, seam: Seam) {
        self.failing.write().await.insert(seam);
    }

    pub async fn stall(&self, seam: Seam, delay: Duration) {
        self.stalled.write().await.insert(seam, delay);
    }

    /// Delays plate lookups for one plate number only.
    pub async fn stall_plate(&self, number: &str, delay: Duration) {
        self.stalled_plates.write().await.insert(number.to_string(), delay);
    }

    pub async fn scan_logs(&self) -> Vec<(String, ScanLogEntry)> {
        self.scan_logs.read().await.clone()
    }

    async fn enter(&self, seam: Seam) -> Result<(), StoreError> {
        let delay = self.stalled.read().await.get(&seam).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.read().await.contains(&seam) {
            return Err(StoreError::Unavailable(format!("{:?} injected failure", seam)));
        }
        Ok(())
    }
}

#[async_trait]
impl PlateStore for MemoryStore {
    async fn find_plate_by_number(&self, number: &str) -> Result<Option<Plate>, StoreError> {
        self.enter(Seam::FindPlate).await?;
        let delay = self.stalled_plates.read().await.get(number).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let plates = self.plates.read().await;
        Ok(plates.iter().find(|p| p.plate_number == number).cloned())
    }

    async fn list_plates_by_vehicle(&self, vehicle_id: &str) -> Result<Vec<Plate>, StoreError> {
        self.enter(Seam::ListPlates).await?;
        let plates = self.plates.read().await;
        Ok(plates
            .iter()
            .filter(|p| p.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn find_registration_form_by_vehicle(
        &self,
        vehicle_id: &str,
    ) -> Result<Option<RegistrationForm>, StoreError> {
        self.enter(Seam::FindRegistration).await?;
        Ok(self.forms.read().await.get(vehicle_id).cloned())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_client_id(&self, client_id: &str) -> Result<User, StoreError> {
        self.enter(Seam::FindUser).await?;
        self.users
            .read()
            .await
            .get(client_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "user",
                key: client_id.to_string(),
            })
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append_scan_log(&self, entry: &ScanLogEntry) -> Result<String, StoreError> {
        self.enter(Seam::AppendScanLog).await?;
        let log_id = Uuid::new_v4().simple().to_string();
        self.scan_logs
            .write()
            .await
            .push((log_id.clone(), entry.clone()));
        Ok(log_id)
    }
}
