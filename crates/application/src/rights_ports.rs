use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use perimetra_core::AppResult;
use perimetra_domain::{AccessGrant, PerimeterTree};

/// Repository port for the organizational hierarchy.
///
/// Ancestor chains and bounded descendant lists are read from the returned
/// snapshot, so one call never mixes two versions of the hierarchy.
#[async_trait]
pub trait PerimeterRepository: Send + Sync {
    /// Returns the current validated hierarchy snapshot.
    async fn snapshot(&self) -> AppResult<Arc<PerimeterTree>>;
}

/// Repository port for access grants.
#[async_trait]
pub trait GrantRepository: Send + Sync {
    /// Lists the non-deleted grants of every profile owned by the user that
    /// are valid at `now`.
    async fn valid_grants_for(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<AccessGrant>>;
}
