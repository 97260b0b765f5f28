use crate::metrics::Metrics;
use crate::resolver::Resolution;
use crate::store::{bounded, StoreError, Stores};
use crate::types::ScanLogEntry;
use chrono::{DateTime, Utc};
use log::{error, info};
use tokio::time::Instant;

/// Builds the audit entry, or nothing. A plate record, a non-empty detail
/// pack and a resolved registration form are all required.
pub fn audit_entry(resolution: &Resolution, scanned_at: DateTime<Utc>) -> Option<ScanLogEntry> {
    let plate = resolution.record.as_ref()?;
    let details = resolution.details.as_ref().filter(|d| !d.is_empty())?;
    let form = details.registration_form.as_ref()?;
    Some(ScanLogEntry {
        plate_id: plate.plate_id.clone(),
        registration_id: form.registration_id.clone(),
        lto_client_id: form.lto_client_id.clone(),
        scanned_at,
    })
}

/// Makes at most one audit write for the resolution. Failures are reported
/// to the operator log and counters only; the caller never sees them.
pub async fn record(
    stores: &Stores,
    metrics: &Metrics,
    resolution: &Resolution,
    deadline: Instant,
) -> Option<String> {
    let entry = audit_entry(resolution, Utc::now())?;
    match bounded(deadline, stores.audit.append_scan_log(&entry)).await {
        Ok(log_id) => {
            info!(
                "Logged scan {} of plate {} (registration {})",
                log_id, resolution.plate, entry.registration_id
            );
            metrics.scan_logged();
            Some(log_id)
        }
        Err(e) => {
            error!("Failed to write scan log for plate {}: {}", resolution.plate, e);
            metrics.audit_failure();
            if let StoreError::DeadlineElapsed = e {
                metrics.deadline_elapsed();
            }
            None
        }
    }
}
