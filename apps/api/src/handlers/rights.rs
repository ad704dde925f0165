use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use perimetra_core::AppResult;
use perimetra_domain::PerimeterId;

use crate::dto::{
    DataRightResponse, DataRightsQuery, ManageablePerimetersQuery, PerimeterNodeResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn data_rights_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<DataRightsQuery>,
) -> ApiResult<Json<Vec<DataRightResponse>>> {
    let perimeter_ids = parse_perimeter_ids(query.perimeters_ids.as_deref())?;
    let rights = state
        .rights_service
        .get_data_rights(
            &user_id,
            &perimeter_ids,
            query.pop_children.unwrap_or(false),
        )
        .await?;

    Ok(Json(
        rights.into_iter().map(DataRightResponse::from).collect(),
    ))
}

pub async fn manageable_perimeters_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ManageablePerimetersQuery>,
) -> ApiResult<Json<Vec<PerimeterNodeResponse>>> {
    let depth = query.depth.unwrap_or(state.manageable_default_depth);
    let nodes = state
        .rights_service
        .get_manageable_perimeters(&user_id, depth)
        .await?;

    Ok(Json(
        nodes.into_iter().map(PerimeterNodeResponse::from).collect(),
    ))
}

fn parse_perimeter_ids(value: Option<&str>) -> AppResult<Vec<PerimeterId>> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(PerimeterId::from_str)
        .collect()
}

#[cfg(test)]
mod tests;
