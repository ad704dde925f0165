//! JSON seed loader for the hierarchy, the role catalog and user accesses.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use perimetra_core::{AppError, AppResult};
use perimetra_domain::{
    AccessGrant, AccessId, Perimeter, PerimeterId, PerimeterTree, PerimeterType, ProfileId,
    Right, RightDependencies, Role, RoleCatalog, RoleId,
};
use serde::Deserialize;

use crate::{InMemoryGrantRepository, StoredAccess};

/// Raw seed file contents.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedDocument {
    perimeters: Vec<PerimeterRecord>,
    roles: Vec<Role>,
    #[serde(default)]
    right_dependencies: Option<Vec<RightDependencyRecord>>,
    #[serde(default)]
    profiles: Vec<ProfileRecord>,
    #[serde(default)]
    accesses: Vec<AccessRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct PerimeterRecord {
    id: i64,
    name: String,
    #[serde(rename = "type")]
    perimeter_type: PerimeterType,
    #[serde(default)]
    parent_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct RightDependencyRecord {
    right: Right,
    implies: Right,
}

#[derive(Debug, Clone, Deserialize)]
struct ProfileRecord {
    id: i64,
    user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AccessRecord {
    id: i64,
    profile_id: i64,
    role_id: i64,
    perimeter_id: i64,
    start_datetime: DateTime<Utc>,
    end_datetime: DateTime<Utc>,
    #[serde(default)]
    deleted_at: Option<DateTime<Utc>>,
}

/// Validated snapshots built from a seed document.
#[derive(Debug)]
pub struct SeedParts {
    /// Hierarchy snapshot.
    pub tree: PerimeterTree,
    /// Role catalog closed over the dependency graph.
    pub catalog: RoleCatalog,
    /// Grant repository holding every profile and access.
    pub grants: InMemoryGrantRepository,
}

impl SeedDocument {
    /// Parses a seed document from JSON text.
    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json)
            .map_err(|error| AppError::Validation(format!("invalid seed document: {error}")))
    }

    /// Reads and parses a seed document from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to read seed file '{}': {error}",
                path.display()
            ))
        })?;
        Self::from_json(&json)
    }

    /// Validates the document and builds the snapshots.
    ///
    /// Accesses must reference a known profile, role and perimeter.
    pub fn into_parts(self) -> AppResult<SeedParts> {
        let perimeters = self
            .perimeters
            .into_iter()
            .map(|record| {
                Perimeter::new(
                    PerimeterId::new(record.id),
                    record.name,
                    record.perimeter_type,
                    record.parent_id.map(PerimeterId::new),
                )
            })
            .collect::<AppResult<Vec<_>>>()?;
        let tree = PerimeterTree::new(perimeters).map_err(invalid_seed)?;

        let dependencies = match self.right_dependencies {
            Some(edges) => RightDependencies::new(
                edges
                    .into_iter()
                    .map(|edge| (edge.right, edge.implies)),
            )
            .map_err(invalid_seed)?,
            None => RightDependencies::default(),
        };
        let catalog = RoleCatalog::new(self.roles, &dependencies).map_err(invalid_seed)?;

        let profiles: HashMap<ProfileId, String> = self
            .profiles
            .into_iter()
            .map(|profile| (ProfileId::new(profile.id), profile.user_id))
            .collect();

        let mut accesses = Vec::with_capacity(self.accesses.len());
        for record in self.accesses {
            let role_id = RoleId::new(record.role_id);
            catalog.require(role_id).map_err(invalid_seed)?;
            let perimeter_id = PerimeterId::new(record.perimeter_id);
            tree.require(perimeter_id).map_err(invalid_seed)?;

            let grant = AccessGrant::new(
                AccessId::new(record.id),
                ProfileId::new(record.profile_id),
                role_id,
                perimeter_id,
                record.start_datetime,
                record.end_datetime,
            )
            .map_err(invalid_seed)?;
            accesses.push(StoredAccess {
                grant,
                deleted_at: record.deleted_at,
            });
        }
        let grants = InMemoryGrantRepository::new(profiles, accesses)?;

        tracing::info!(
            perimeter_count = tree.len(),
            role_count = catalog.len(),
            "seed document loaded"
        );
        Ok(SeedParts {
            tree,
            catalog,
            grants,
        })
    }
}

fn invalid_seed(error: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("invalid seed document: {error}"))
}
