//! Role definitions and the immutable catalog loaded at startup.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use perimetra_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{ResolutionError, Right, RightSet};

/// Stable role identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoleId(i64);

impl RoleId {
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

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Named matrix of rights with its management scoping flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    rights: RightSet,
    #[serde(default)]
    editable_same_level: bool,
    #[serde(default)]
    editable_inferior_levels: bool,
    #[serde(default)]
    is_global: bool,
}

impl Role {
    /// Creates a perimeter-scoped role without management scoping.
    pub fn new(
        id: RoleId,
        name: impl Into<String>,
        rights: impl IntoIterator<Item = Right>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            rights: rights.into_iter().collect(),
            editable_same_level: false,
            editable_inferior_levels: false,
            is_global: false,
        })
    }

    /// Lets holders administer accesses on the grant perimeter itself.
    #[must_use]
    pub fn editing_same_level(mut self) -> Self {
        self.editable_same_level = true;
        self
    }

    /// Lets holders administer accesses strictly below the grant perimeter.
    #[must_use]
    pub fn editing_inferior_levels(mut self) -> Self {
        self.editable_inferior_levels = true;
        self
    }

    /// Makes the role apply regardless of the grant perimeter.
    #[must_use]
    pub fn global(mut self) -> Self {
        self.is_global = true;
        self
    }

    /// Returns the role id.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the role rights.
    #[must_use]
    pub fn rights(&self) -> RightSet {
        self.rights
    }

    /// Returns whether the role carries the right.
    #[must_use]
    pub fn has(&self, right: Right) -> bool {
        self.rights.contains(right)
    }

    /// Returns whether the role reads patient data in any form.
    #[must_use]
    pub fn has_data_read_right(&self) -> bool {
        self.rights.intersects(RightSet::DATA_READ)
    }

    /// Returns whether holders may administer the grant perimeter itself.
    #[must_use]
    pub fn editable_same_level(&self) -> bool {
        self.editable_same_level
    }

    /// Returns whether holders may administer strict descendants of the grant perimeter.
    #[must_use]
    pub fn editable_inferior_levels(&self) -> bool {
        self.editable_inferior_levels
    }

    /// Returns whether the role ignores perimeter scoping.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.is_global
    }

    /// Returns whether the role carries any management scope.
    #[must_use]
    pub fn is_manager(&self) -> bool {
        self.editable_same_level || self.editable_inferior_levels
    }
}

/// Directed "implies" graph between rights, checked for cycles on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RightDependencies {
    edges: BTreeMap<Right, BTreeSet<Right>>,
}

impl RightDependencies {
    /// Builds the graph from `(right, implied)` edges.
    pub fn new(
        edges: impl IntoIterator<Item = (Right, Right)>,
    ) -> Result<Self, ResolutionError> {
        let mut graph: BTreeMap<Right, BTreeSet<Right>> = BTreeMap::new();
        for (right, implied) in edges {
            graph.entry(right).or_default().insert(implied);
        }
        let dependencies = Self { edges: graph };
        dependencies.check_acyclic()?;
        Ok(dependencies)
    }

    /// Returns the graph without any edge.
    #[must_use]
    pub fn none() -> Self {
        Self {
            edges: BTreeMap::new(),
        }
    }

    /// Returns the rights directly implied by `right`.
    pub fn implied_by(&self, right: Right) -> impl Iterator<Item = Right> + '_ {
        self.edges.get(&right).into_iter().flatten().copied()
    }

    /// Iterates over all edges.
    pub fn edges(&self) -> impl Iterator<Item = (Right, Right)> + '_ {
        self.edges
            .iter()
            .flat_map(|(right, implied)| implied.iter().map(move |target| (*right, *target)))
    }

    /// Returns `rights` closed over the implication graph.
    #[must_use]
    pub fn close(&self, rights: RightSet) -> RightSet {
        let mut closed = rights;
        let mut pending: Vec<Right> = rights.iter().collect();
        while let Some(right) = pending.pop() {
            for implied in self.implied_by(right) {
                if !closed.contains(implied) {
                    closed.insert(implied);
                    pending.push(implied);
                }
            }
        }
        closed
    }

    fn check_acyclic(&self) -> Result<(), ResolutionError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            graph: &RightDependencies,
            right: Right,
            marks: &mut BTreeMap<Right, Mark>,
        ) -> Result<(), ResolutionError> {
            match marks.get(&right) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => return Err(ResolutionError::CyclicRightDependency(right)),
                None => {}
            }
            marks.insert(right, Mark::Visiting);
            for implied in graph.implied_by(right) {
                visit(graph, implied, marks)?;
            }
            marks.insert(right, Mark::Done);
            Ok(())
        }

        let mut marks = BTreeMap::new();
        for right in self.edges.keys() {
            visit(self, *right, &mut marks)?;
        }
        Ok(())
    }
}

impl Default for RightDependencies {
    fn default() -> Self {
        Self {
            edges: BTreeMap::from([
                (
                    Right::ManageAdminAccesses,
                    BTreeSet::from([Right::ReadAdminAccesses]),
                ),
                (
                    Right::ManageDataAccesses,
                    BTreeSet::from([Right::ReadDataAccesses]),
                ),
                (
                    Right::ReadPatientNominative,
                    BTreeSet::from([Right::ReadPatientPseudonymized]),
                ),
                (
                    Right::SearchByIpp,
                    BTreeSet::from([Right::ReadPatientNominative]),
                ),
                (
                    Right::ExportCsvNominative,
                    BTreeSet::from([Right::ReadPatientNominative]),
                ),
                (
                    Right::ExportCsvPseudonymized,
                    BTreeSet::from([Right::ReadPatientPseudonymized]),
                ),
                (
                    Right::TransferJupyterNominative,
                    BTreeSet::from([Right::ReadPatientNominative]),
                ),
                (
                    Right::TransferJupyterPseudonymized,
                    BTreeSet::from([Right::ReadPatientPseudonymized]),
                ),
            ]),
        }
    }
}

/// Read-only table of roles, shared across concurrent resolutions.
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    roles: BTreeMap<RoleId, Arc<Role>>,
}

impl RoleCatalog {
    /// Builds the catalog, closing every role over the dependency graph.
    pub fn new(
        roles: impl IntoIterator<Item = Role>,
        dependencies: &RightDependencies,
    ) -> Result<Self, ResolutionError> {
        let mut catalog = BTreeMap::new();
        for mut role in roles {
            role.rights = dependencies.close(role.rights);
            let id = role.id;
            if catalog.insert(id, Arc::new(role)).is_some() {
                return Err(ResolutionError::DuplicateRole(id));
            }
        }

        Ok(Self { roles: catalog })
    }

    /// Returns a role by id.
    #[must_use]
    pub fn get(&self, id: RoleId) -> Option<&Arc<Role>> {
        self.roles.get(&id)
    }

    /// Returns a shared role or fails with `UnknownRole`.
    pub fn require(&self, id: RoleId) -> Result<Arc<Role>, ResolutionError> {
        self.get(id)
            .cloned()
            .ok_or(ResolutionError::UnknownRole(id))
    }

    /// Iterates over roles ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.values().map(Arc::as_ref)
    }

    /// Returns the number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
