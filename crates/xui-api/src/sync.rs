// Reconcile an application user into the panel.

use tracing::{info, warn};

use crate::client::{ApiResponse, XuiClient};
use crate::error::Error;
use crate::models::SourceUser;

/// Which branch a sync took, with the panel's answer.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Created(ApiResponse),
    Updated(ApiResponse),
}

impl SyncOutcome {
    pub fn response(&self) -> &ApiResponse {
        match self {
            Self::Created(r) | Self::Updated(r) => r,
        }
    }
}

impl XuiClient {
    /// Create or update the panel client matching `user.telegram_id`.
    ///
    /// Optimistic upsert: look up by `tgId`, then update or add. There is
    /// no locking, so two concurrent syncs of a new user may both add.
    /// Panel-level failures are logged and returned in the outcome, never
    /// raised; only transport faults produce `Err`.
    pub async fn sync_user(
        &self,
        user: &SourceUser,
        inbound: Option<&str>,
    ) -> Result<SyncOutcome, Error> {
        let patch = user.to_patch();

        let outcome = if self.client_by_tg_id(user.telegram_id, inbound).await?.is_some() {
            SyncOutcome::Updated(self.update_client(&patch, inbound).await?)
        } else {
            SyncOutcome::Created(self.add_client(patch, inbound).await?)
        };

        let (action, response) = match &outcome {
            SyncOutcome::Created(r) => ("created", r),
            SyncOutcome::Updated(r) => ("updated", r),
        };
        if response.is_success() {
            info!(
                telegram_id = user.telegram_id,
                action,
                response = %response.to_value(),
                "panel client synced"
            );
        } else {
            warn!(
                telegram_id = user.telegram_id,
                action,
                response = %response.to_value(),
                "panel client sync failed"
            );
        }

        Ok(outcome)
    }
}
