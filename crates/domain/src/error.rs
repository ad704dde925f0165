use perimetra_core::AppError;
use thiserror::Error;

use crate::{AccessId, PerimeterId, Right, RoleId};

/// Failures raised while building snapshots or resolving rights.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// Neither perimeter ids nor the pop-children flag were supplied.
    #[error("either perimeter ids or the pop children flag must be provided")]
    InvalidRequest,

    /// A requested perimeter does not exist in the snapshot.
    #[error("perimeter '{0}' does not exist")]
    UnknownPerimeter(PerimeterId),

    /// A grant references a role missing from the catalog.
    #[error("role '{0}' is not part of the role catalog")]
    UnknownRole(RoleId),

    /// A stored grant was issued on a perimeter missing from the snapshot.
    #[error("access '{access_id}' references perimeter '{perimeter_id}' missing from the hierarchy")]
    DanglingGrant {
        /// Access holding the dangling reference.
        access_id: AccessId,
        /// Perimeter that could not be found.
        perimeter_id: PerimeterId,
    },

    /// A parent referenced by a perimeter is absent from the provided set.
    #[error("perimeter '{perimeter_id}' references parent '{parent_id}' missing from the loaded set")]
    MissingAncestor {
        /// Perimeter holding the dangling reference.
        perimeter_id: PerimeterId,
        /// Parent id that could not be found.
        parent_id: PerimeterId,
    },

    /// A parent walk did not reach the root level within the level count.
    #[error("parent chain of perimeter '{perimeter_id}' did not reach a root after {hops} hops")]
    CorruptHierarchy {
        /// Perimeter where the walk started.
        perimeter_id: PerimeterId,
        /// Hops performed before giving up.
        hops: usize,
    },

    /// The same perimeter id appears twice in a snapshot.
    #[error("perimeter '{0}' appears more than once in the snapshot")]
    DuplicatePerimeter(PerimeterId),

    /// The same role id appears twice in the catalog.
    #[error("role '{0}' appears more than once in the catalog")]
    DuplicateRole(RoleId),

    /// A grant starts after it ends.
    #[error("access '{0}' starts after it ends")]
    InvalidValidityWindow(String),

    /// The right dependency graph contains a cycle.
    #[error("right dependency graph has a cycle through '{}'", .0.as_str())]
    CyclicRightDependency(Right),
}

impl ResolutionError {
    /// Returns whether the error reveals inconsistent stored data rather than a bad request.
    #[must_use]
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            Self::UnknownRole(_)
                | Self::DanglingGrant { .. }
                | Self::MissingAncestor { .. }
                | Self::CorruptHierarchy { .. }
                | Self::DuplicatePerimeter(_)
                | Self::DuplicateRole(_)
                | Self::CyclicRightDependency(_)
        )
    }
}

impl From<ResolutionError> for AppError {
    fn from(value: ResolutionError) -> Self {
        match value {
            ResolutionError::InvalidRequest | ResolutionError::InvalidValidityWindow(_) => {
                AppError::Validation(value.to_string())
            }
            ResolutionError::UnknownPerimeter(_) => AppError::NotFound(value.to_string()),
            _ => AppError::Internal(value.to_string()),
        }
    }
}
