use perimetra_domain::{DataRight, PerimeterNode};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Query string of the data rights endpoint.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/data-rights-query.ts"
)]
pub struct DataRightsQuery {
    /// Comma-separated perimeter ids, e.g. `1,2,3`.
    pub perimeters_ids: Option<String>,
    pub pop_children: Option<bool>,
}

/// Query string of the manageable perimeters endpoint.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/manageable-perimeters-query.ts"
)]
pub struct ManageablePerimetersQuery {
    pub depth: Option<usize>,
}

/// Effective rights of the user on one perimeter.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/data-right-response.ts"
)]
pub struct DataRightResponse {
    pub perimeter_id: i64,
    pub access_ids: Vec<i64>,
    pub right_read_patient_nominative: bool,
    pub right_read_patient_pseudonymized: bool,
    pub right_search_patients_by_ipp: bool,
    pub right_export_csv_nominative: bool,
    pub right_export_csv_pseudonymized: bool,
    pub right_transfer_jupyter_nominative: bool,
    pub right_transfer_jupyter_pseudonymized: bool,
}

impl From<DataRight> for DataRightResponse {
    fn from(right: DataRight) -> Self {
        Self {
            perimeter_id: right.perimeter_id().value(),
            access_ids: right.access_ids().iter().map(|id| id.value()).collect(),
            right_read_patient_nominative: right.read_nominative(),
            right_read_patient_pseudonymized: right.read_pseudonymized(),
            right_search_patients_by_ipp: right.search_by_ipp(),
            right_export_csv_nominative: right.export_csv_nominative(),
            right_export_csv_pseudonymized: right.export_csv_pseudonymized(),
            right_transfer_jupyter_nominative: right.transfer_jupyter_nominative(),
            right_transfer_jupyter_pseudonymized: right.transfer_jupyter_pseudonymized(),
        }
    }
}

/// Manageable perimeter with its nested children.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/perimeter-node-response.ts"
)]
pub struct PerimeterNodeResponse {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub perimeter_type: String,
    pub children: Vec<PerimeterNodeResponse>,
}

impl From<PerimeterNode> for PerimeterNodeResponse {
    fn from(node: PerimeterNode) -> Self {
        Self {
            id: node.id.value(),
            name: node.name,
            perimeter_type: node.perimeter_type.as_str().to_owned(),
            children: node.children.into_iter().map(Self::from).collect(),
        }
    }
}
