//! Time-bounded grants of a role on a perimeter.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PerimeterId, PerimeterTree, ResolutionError, Role, RoleCatalog, RoleId};

/// Stable access identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccessId(i64);

impl AccessId {
    /// Creates an identifier from its stored value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the stored value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AccessId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Identity owning accesses; one user may hold several profiles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProfileId(i64);

impl ProfileId {
    /// Creates an identifier from its stored value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the stored value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Binding of a role to a profile on a perimeter for a validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessGrant {
    id: AccessId,
    profile_id: ProfileId,
    role_id: RoleId,
    perimeter_id: PerimeterId,
    manual_start_datetime: DateTime<Utc>,
    manual_end_datetime: DateTime<Utc>,
}

impl AccessGrant {
    /// Creates a grant, rejecting windows that end before they start.
    pub fn new(
        id: AccessId,
        profile_id: ProfileId,
        role_id: RoleId,
        perimeter_id: PerimeterId,
        manual_start_datetime: DateTime<Utc>,
        manual_end_datetime: DateTime<Utc>,
    ) -> Result<Self, ResolutionError> {
        if manual_start_datetime > manual_end_datetime {
            return Err(ResolutionError::InvalidValidityWindow(id.to_string()));
        }

        Ok(Self {
            id,
            profile_id,
            role_id,
            perimeter_id,
            manual_start_datetime,
            manual_end_datetime,
        })
    }

    /// Returns the access id.
    #[must_use]
    pub fn id(&self) -> AccessId {
        self.id
    }

    /// Returns the owning profile.
    #[must_use]
    pub fn profile_id(&self) -> ProfileId {
        self.profile_id
    }

    /// Returns the granted role.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns the perimeter the role is granted on.
    #[must_use]
    pub fn perimeter_id(&self) -> PerimeterId {
        self.perimeter_id
    }

    /// Returns the start of the validity window.
    #[must_use]
    pub fn manual_start_datetime(&self) -> DateTime<Utc> {
        self.manual_start_datetime
    }

    /// Returns the end of the validity window.
    #[must_use]
    pub fn manual_end_datetime(&self) -> DateTime<Utc> {
        self.manual_end_datetime
    }

    /// Returns whether `now` falls inside the inclusive validity window.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.manual_start_datetime <= now && now <= self.manual_end_datetime
    }
}

/// Valid grant bound to its catalog role.
#[derive(Debug, Clone)]
pub struct ScopedGrant {
    access_id: AccessId,
    perimeter_id: PerimeterId,
    role: Arc<Role>,
}

impl ScopedGrant {
    /// Returns the access id.
    #[must_use]
    pub fn access_id(&self) -> AccessId {
        self.access_id
    }

    /// Returns the perimeter the grant was issued on.
    #[must_use]
    pub fn perimeter_id(&self) -> PerimeterId {
        self.perimeter_id
    }

    /// Returns the granted role.
    #[must_use]
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Returns the perimeters the grant is evaluated at.
    ///
    /// Global roles ignore their own perimeter and anchor at every root. A
    /// grant issued on a perimeter missing from `tree` is dangling.
    pub fn anchors(&self, tree: &PerimeterTree) -> Result<Vec<PerimeterId>, ResolutionError> {
        if self.role.is_global() {
            return Ok(tree.roots().map(|perimeter| perimeter.id()).collect());
        }
        if !tree.contains(self.perimeter_id) {
            return Err(ResolutionError::DanglingGrant {
                access_id: self.access_id,
                perimeter_id: self.perimeter_id,
            });
        }

        Ok(vec![self.perimeter_id])
    }

    pub(crate) fn applies_at(&self, perimeter_id: PerimeterId, is_root: bool) -> bool {
        if self.role.is_global() {
            is_root
        } else {
            self.perimeter_id == perimeter_id
        }
    }
}

/// Currently valid grants of one user, bound to the role catalog.
#[derive(Debug, Clone, Default)]
pub struct AccessGrantSet {
    grants: Vec<ScopedGrant>,
}

impl AccessGrantSet {
    /// Keeps the grants valid at `now` and resolves their roles.
    pub fn build(
        grants: &[AccessGrant],
        catalog: &RoleCatalog,
        now: DateTime<Utc>,
    ) -> Result<Self, ResolutionError> {
        let mut scoped = Vec::with_capacity(grants.len());
        for grant in grants.iter().filter(|grant| grant.is_valid_at(now)) {
            scoped.push(ScopedGrant {
                access_id: grant.id(),
                perimeter_id: grant.perimeter_id(),
                role: catalog.require(grant.role_id())?,
            });
        }
        scoped.sort_by_key(ScopedGrant::access_id);

        Ok(Self { grants: scoped })
    }

    /// Returns the number of grants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Returns whether no grant is valid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Iterates over the grants ordered by access id.
    pub fn iter(&self) -> impl Iterator<Item = &ScopedGrant> {
        self.grants.iter()
    }

    /// Returns the grants issued directly on a perimeter.
    pub fn at_perimeter(&self, perimeter_id: PerimeterId) -> impl Iterator<Item = &ScopedGrant> {
        self.grants
            .iter()
            .filter(move |grant| grant.perimeter_id == perimeter_id)
    }

    /// Returns the distinct perimeters grants were issued on.
    #[must_use]
    pub fn perimeter_ids(&self) -> BTreeSet<PerimeterId> {
        self.grants.iter().map(ScopedGrant::perimeter_id).collect()
    }

    /// Returns the grants whose role reads patient data.
    pub fn with_data_read_rights(&self) -> impl Iterator<Item = &ScopedGrant> {
        self.grants
            .iter()
            .filter(|grant| grant.role.has_data_read_right())
    }

    /// Returns the grants whose role carries a management scope.
    pub fn managers(&self) -> impl Iterator<Item = &ScopedGrant> {
        self.grants.iter().filter(|grant| grant.role.is_manager())
    }
}
