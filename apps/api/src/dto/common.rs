use perimetra_domain::Role;
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of a catalog role with its closed rights.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
    pub rights: Vec<String>,
    pub editable_same_level: bool,
    pub editable_inferior_levels: bool,
    pub is_global: bool,
}

impl From<&Role> for RoleResponse {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id().value(),
            name: role.name().to_owned(),
            rights: role
                .rights()
                .iter()
                .map(|right| right.as_str().to_owned())
                .collect(),
            editable_same_level: role.editable_same_level(),
            editable_inferior_levels: role.editable_inferior_levels(),
            is_global: role.is_global(),
        }
    }
}
