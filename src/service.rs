use crate::decoder;
use crate::metrics::Metrics;
use crate::resolver;
use crate::scanlog;
use crate::store::Stores;
use crate::types::PlateCheckResponse;
use chrono::Utc;
use log::{debug, warn};
use std::time::Duration;
use tokio::time::Instant;

/// The per-message pipeline: decode, resolve, then audit. Holds the store
/// collaborators it was constructed with and nothing per-connection.
pub struct PlateCheck {
    stores: Stores,
    metrics: Metrics,
    cycle_timeout: Duration,
}

impl PlateCheck {
    pub fn new(stores: Stores, cycle_timeout: Duration) -> Self {
        PlateCheck {
            stores,
            metrics: Metrics::default(),
            cycle_timeout,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Always yields a response. Malformed input becomes `bad_request`;
    /// store failures degrade the response instead of failing it.
    pub async fn handle(&self, raw: &[u8]) -> PlateCheckResponse {
        self.metrics.message_received();
        let request = match decoder::decode(raw) {
            Ok(request) => request,
            Err(e) => {
                warn!("{}", e);
                self.metrics.bad_request();
                return PlateCheckResponse::bad_request();
            }
        };
        debug!("Checking plate {:?}", request.plate);

        let deadline = Instant::now() + self.cycle_timeout;
        let resolution = resolver::resolve(
            &self.stores,
            &self.metrics,
            &request.plate,
            Utc::now(),
            deadline,
        )
        .await;
        scanlog::record(&self.stores, &self.metrics, &resolution, deadline).await;
        resolution.into_response()
    }
}
