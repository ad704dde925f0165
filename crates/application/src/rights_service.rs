use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use perimetra_core::{AppError, AppResult};
use perimetra_domain::{
    AccessGrantSet, DataRight, Perimeter, PerimeterId, PerimeterNode, ResolutionError,
    RoleCatalog, manageable_perimeter_ids, manageable_perimeters, resolve_data_rights, rootify,
    shape,
};

use crate::{GrantRepository, PerimeterRepository};

/// Application service answering "what can this user do, and where".
#[derive(Clone)]
pub struct RightsService {
    perimeters: Arc<dyn PerimeterRepository>,
    grants: Arc<dyn GrantRepository>,
    catalog: Arc<RoleCatalog>,
}

impl RightsService {
    /// Creates a new rights service from repository implementations and the
    /// role catalog loaded at startup.
    #[must_use]
    pub fn new(
        perimeters: Arc<dyn PerimeterRepository>,
        grants: Arc<dyn GrantRepository>,
        catalog: Arc<RoleCatalog>,
    ) -> Self {
        Self {
            perimeters,
            grants,
            catalog,
        }
    }

    /// Returns the role catalog.
    #[must_use]
    pub fn roles(&self) -> &RoleCatalog {
        &self.catalog
    }

    /// Resolves effective data rights of a user on the requested perimeters.
    ///
    /// With no perimeter ids and `pop_children` set, the perimeters of the
    /// user's reading grants are resolved instead.
    pub async fn get_data_rights(
        &self,
        user_id: &str,
        perimeter_ids: &[PerimeterId],
        pop_children: bool,
    ) -> AppResult<Vec<DataRight>> {
        if perimeter_ids.is_empty() && !pop_children {
            return Err(ResolutionError::InvalidRequest.into());
        }

        let grants = self.grant_set(user_id).await?;
        let tree = self.perimeters.snapshot().await?;
        let required: Vec<PerimeterId> = if perimeter_ids.is_empty() {
            let mut anchors = BTreeSet::new();
            for grant in grants.with_data_read_rights() {
                anchors.extend(grant.anchors(&tree).map_err(|error| reject(user_id, error))?);
            }
            anchors.into_iter().collect()
        } else {
            perimeter_ids.to_vec()
        };
        if required.is_empty() {
            return Ok(Vec::new());
        }

        let flat = tree.with_ancestors(&required)?;
        let rooted = rootify(&flat, &required).map_err(|error| reject(user_id, error))?;
        let rights = resolve_data_rights(&required, &grants, &rooted, pop_children);

        tracing::debug!(
            user_id,
            requested = required.len(),
            resolved = rights.len(),
            pop_children,
            "resolved data rights"
        );
        Ok(rights)
    }

    /// Returns the manageable perimeters of a user as depth-bounded trees.
    ///
    /// Every lookup of one call reads the same hierarchy snapshot.
    pub async fn get_manageable_perimeters(
        &self,
        user_id: &str,
        max_depth: usize,
    ) -> AppResult<Vec<PerimeterNode>> {
        let grants = self.grant_set(user_id).await?;
        let tree = self.perimeters.snapshot().await?;
        let tops =
            manageable_perimeters(&grants, &tree).map_err(|error| reject(user_id, error))?;
        if tops.is_empty() {
            return Ok(Vec::new());
        }

        let top_ids: Vec<PerimeterId> = tops.iter().map(Perimeter::id).collect();
        let flat = tree.children_within(&top_ids, max_depth)?;
        let nodes = shape(&flat, &tree, max_depth).map_err(|error| reject(user_id, error))?;

        tracing::debug!(
            user_id,
            tops = top_ids.len(),
            perimeter_count = flat.len(),
            "resolved manageable perimeters"
        );
        Ok(nodes)
    }

    /// Returns every perimeter the user may administer.
    pub async fn manageable_perimeter_ids(
        &self,
        user_id: &str,
    ) -> AppResult<BTreeSet<PerimeterId>> {
        let grants = self.grant_set(user_id).await?;
        let tree = self.perimeters.snapshot().await?;
        manageable_perimeter_ids(&grants, &tree).map_err(|error| reject(user_id, error))
    }

    /// Ensures the user may administer accesses on the perimeter.
    pub async fn require_manage_access_on(
        &self,
        user_id: &str,
        perimeter_id: PerimeterId,
    ) -> AppResult<()> {
        if self.can_manage_access_on(user_id, perimeter_id).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{user_id}' cannot manage accesses on perimeter '{perimeter_id}'"
        )))
    }

    /// Returns whether the user may administer accesses on the perimeter.
    pub async fn can_manage_access_on(
        &self,
        user_id: &str,
        perimeter_id: PerimeterId,
    ) -> AppResult<bool> {
        let grants = self.grant_set(user_id).await?;
        let tree = self.perimeters.snapshot().await?;
        tree.require(perimeter_id)?;

        let manageable =
            manageable_perimeter_ids(&grants, &tree).map_err(|error| reject(user_id, error))?;
        Ok(manageable.contains(&perimeter_id))
    }

    async fn grant_set(&self, user_id: &str) -> AppResult<AccessGrantSet> {
        let now = Utc::now();
        let grants = self.grants.valid_grants_for(user_id, now).await?;
        AccessGrantSet::build(&grants, &self.catalog, now).map_err(|error| reject(user_id, error))
    }
}

fn reject(user_id: &str, error: ResolutionError) -> AppError {
    if error.is_integrity_violation() {
        tracing::error!(user_id, error = %error, "access data integrity violation");
    }
    error.into()
}
