use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use perimetra_application::GrantRepository;
use perimetra_core::{AppError, AppResult};
use perimetra_domain::{AccessGrant, AccessId, ProfileId};
use tokio::sync::RwLock;

/// Stored access row; soft-deleted rows keep their `deleted_at` stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccess {
    /// Granted role, perimeter and validity window.
    pub grant: AccessGrant,
    /// Soft-deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl StoredAccess {
    /// Wraps a live grant.
    #[must_use]
    pub fn live(grant: AccessGrant) -> Self {
        Self {
            grant,
            deleted_at: None,
        }
    }

    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// In-memory grant repository keyed by profile owner.
#[derive(Debug, Default)]
pub struct InMemoryGrantRepository {
    profiles: RwLock<HashMap<ProfileId, String>>,
    accesses: RwLock<BTreeMap<AccessId, StoredAccess>>,
}

impl InMemoryGrantRepository {
    /// Creates a repository from profile owners and stored accesses.
    pub fn new(
        profiles: HashMap<ProfileId, String>,
        accesses: impl IntoIterator<Item = StoredAccess>,
    ) -> AppResult<Self> {
        let mut stored = BTreeMap::new();
        for access in accesses {
            check_profile(&profiles, &access.grant)?;
            let id = access.grant.id();
            if stored.insert(id, access).is_some() {
                return Err(AppError::Conflict(format!("access '{id}' already exists")));
            }
        }

        Ok(Self {
            profiles: RwLock::new(profiles),
            accesses: RwLock::new(stored),
        })
    }

    /// Assigns a profile to a user.
    pub async fn register_profile(&self, profile_id: ProfileId, user_id: &str) -> AppResult<()> {
        let mut profiles = self.profiles.write().await;
        match profiles.get(&profile_id) {
            Some(owner) if owner != user_id => Err(AppError::Conflict(format!(
                "profile '{}' already belongs to user '{owner}'",
                profile_id.value()
            ))),
            _ => {
                profiles.insert(profile_id, user_id.to_owned());
                Ok(())
            }
        }
    }

    /// Stores a new access for a registered profile.
    pub async fn save_access(&self, grant: AccessGrant) -> AppResult<()> {
        check_profile(&*self.profiles.read().await, &grant)?;

        let mut accesses = self.accesses.write().await;
        let id = grant.id();
        if accesses.contains_key(&id) {
            return Err(AppError::Conflict(format!("access '{id}' already exists")));
        }
        accesses.insert(id, StoredAccess::live(grant));
        Ok(())
    }

    /// Soft-deletes an access; deleted accesses never reach resolution.
    pub async fn soft_delete_access(&self, id: AccessId, at: DateTime<Utc>) -> AppResult<()> {
        let mut accesses = self.accesses.write().await;
        let access = accesses
            .get_mut(&id)
            .filter(|access| access.is_live())
            .ok_or_else(|| AppError::NotFound(format!("access '{id}' does not exist")))?;
        access.deleted_at = Some(at);
        tracing::info!(access_id = %id, "access soft-deleted");
        Ok(())
    }
}

fn check_profile(profiles: &HashMap<ProfileId, String>, grant: &AccessGrant) -> AppResult<()> {
    if profiles.contains_key(&grant.profile_id()) {
        return Ok(());
    }

    Err(AppError::Validation(format!(
        "access '{}' references unknown profile '{}'",
        grant.id(),
        grant.profile_id().value()
    )))
}

#[async_trait]
impl GrantRepository for InMemoryGrantRepository {
    async fn valid_grants_for(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<AccessGrant>> {
        let profiles = self.profiles.read().await;
        let accesses = self.accesses.read().await;

        Ok(accesses
            .values()
            .filter(|access| access.is_live())
            .filter(|access| {
                profiles
                    .get(&access.grant.profile_id())
                    .is_some_and(|owner| owner == user_id)
            })
            .filter(|access| access.grant.is_valid_at(now))
            .map(|access| access.grant.clone())
            .collect())
    }
}
