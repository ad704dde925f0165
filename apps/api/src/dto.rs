mod common;
mod rights;

pub use common::{HealthResponse, RoleResponse};
pub use rights::{
    DataRightResponse, DataRightsQuery, ManageablePerimetersQuery, PerimeterNodeResponse,
};
