//! Pricing data sync trigger.

use ctxsync_core::model::PricingSyncResponse;
use ctxsync_core::{paths, ApiRequest, ApiTransport, Method, SyncError};
use std::sync::Arc;
use tracing::{error, info};

/// Business result of a sync request that the API accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingSyncOutcome {
    /// The body's `success` flag. A missing or falsy flag counts as `false`.
    pub success: bool,
}

/// Issues a single `GET connect/core-pricing/sync/syncData`.
#[derive(Debug, Clone)]
pub struct PricingSyncTrigger {
    transport: Arc<dyn ApiTransport>,
}

impl PricingSyncTrigger {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Triggers the sync.
    ///
    /// A 2xx status alone does not mean the sync succeeded: callers must
    /// check [`PricingSyncOutcome::success`].
    pub async fn run(&self) -> Result<PricingSyncOutcome, SyncError> {
        let endpoint = paths::PRICING_SYNC;

        let response = self
            .transport
            .send(ApiRequest::get(endpoint))
            .await
            .and_then(|r| r.error_for_status(Method::Get, endpoint))
            .map_err(|e| {
                error!(endpoint, "Pricing sync request failed: {}", e);
                e
            })?;

        let body: PricingSyncResponse = response.json(endpoint)?;
        let success = body.success;
        if success {
            info!(endpoint, "Sync Process Success: true");
        } else {
            info!(endpoint, "Sync process accepted but reported no success");
        }
        Ok(PricingSyncOutcome { success })
    }
}
