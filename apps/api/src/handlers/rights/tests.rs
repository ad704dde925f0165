use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use perimetra_application::RightsService;
use perimetra_infrastructure::{InMemoryPerimeterRepository, SeedDocument};

use super::{data_rights_handler, manageable_perimeters_handler, parse_perimeter_ids};
use crate::dto::{DataRightResponse, DataRightsQuery, ManageablePerimetersQuery};
use crate::handlers::list_roles_handler;
use crate::state::AppState;

const DEMO_SEED: &str = include_str!("../../../../../seed/perimetra.json");

fn state() -> AppState {
    let parts = SeedDocument::from_json(DEMO_SEED).and_then(SeedDocument::into_parts);
    assert!(parts.is_ok());
    let parts = parts.unwrap_or_else(|_| unreachable!());

    AppState {
        rights_service: RightsService::new(
            Arc::new(InMemoryPerimeterRepository::new(parts.tree)),
            Arc::new(parts.grants),
            Arc::new(parts.catalog),
        ),
        manageable_default_depth: 1,
    }
}

fn rights_query(perimeters_ids: Option<&str>, pop_children: Option<bool>) -> DataRightsQuery {
    DataRightsQuery {
        perimeters_ids: perimeters_ids.map(ToOwned::to_owned),
        pop_children,
    }
}

async fn data_rights(
    user_id: &str,
    query: DataRightsQuery,
) -> Result<Vec<DataRightResponse>, StatusCode> {
    data_rights_handler(State(state()), Path(user_id.to_owned()), Query(query))
        .await
        .map(|Json(rights)| rights)
        .map_err(|error| error.into_response().status())
}

#[test]
fn perimeter_ids_are_split_and_trimmed() {
    let ids = parse_perimeter_ids(Some(" 1, 2,,3 "));
    assert!(ids.is_ok());
    let values: Vec<i64> = ids
        .unwrap_or_default()
        .iter()
        .map(|id| id.value())
        .collect();
    assert_eq!(values, vec![1, 2, 3]);
    assert!(parse_perimeter_ids(None).unwrap_or_default().is_empty());
    assert!(parse_perimeter_ids(Some("1,abc")).is_err());
}

#[tokio::test]
async fn data_rights_are_inherited_and_stamped_with_exports() {
    let rights = data_rights("4100001", rights_query(Some("4,7"), None)).await;
    assert!(rights.is_ok());
    let rights = rights.unwrap_or_default();

    assert_eq!(rights.len(), 2);
    for right in &rights {
        assert!(right.right_read_patient_nominative);
        assert!(right.right_search_patients_by_ipp);
        assert!(right.right_export_csv_pseudonymized);
        assert!(!right.right_export_csv_nominative);
        assert_eq!(right.access_ids, vec![100, 101]);
    }
}

#[tokio::test]
async fn sibling_hospital_gets_no_read_right() {
    let rights = data_rights("4100001", rights_query(Some("2"), Some(false))).await;
    assert!(rights.is_ok());
    let rights = rights.unwrap_or_default();

    assert_eq!(rights.len(), 1);
    assert!(!rights[0].right_read_patient_nominative);
    assert!(!rights[0].right_read_patient_pseudonymized);
}

#[tokio::test]
async fn pop_children_without_ids_lists_granted_perimeters() {
    let rights = data_rights("4100001", rights_query(None, Some(true))).await;
    assert!(rights.is_ok());
    let ids: Vec<i64> = rights
        .unwrap_or_default()
        .iter()
        .map(|right| right.perimeter_id)
        .collect();
    assert_eq!(ids, vec![3, 6]);
}

#[tokio::test]
async fn data_rights_reject_bad_requests() {
    let ambiguous = data_rights("4100001", rights_query(None, None)).await;
    assert_eq!(ambiguous.err(), Some(StatusCode::BAD_REQUEST));

    let malformed = data_rights("4100001", rights_query(Some("abc"), None)).await;
    assert_eq!(malformed.err(), Some(StatusCode::BAD_REQUEST));

    let unknown = data_rights("4100001", rights_query(Some("999"), None)).await;
    assert_eq!(unknown.err(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn manageable_perimeters_use_the_default_depth() {
    let result = manageable_perimeters_handler(
        State(state()),
        Path("4100002".to_owned()),
        Query(ManageablePerimetersQuery::default()),
    )
    .await;
    assert!(result.is_ok());
    let Json(nodes) = result.unwrap_or_else(|_| unreachable!());

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].id, 1);
    let hospital = &nodes[0].children[0];
    assert_eq!(hospital.name, "Hopital Sud");
    let departments: Vec<&str> = hospital
        .children
        .iter()
        .map(|node| node.name.as_str())
        .collect();
    assert_eq!(departments, vec!["Cardiologie", "Reanimation"]);
    assert!(hospital.children.iter().all(|node| node.children.is_empty()));

    let json = serde_json::to_value(&nodes[0]);
    assert!(json.is_ok());
    assert_eq!(json.unwrap_or_default()["type"], "group");
}

#[tokio::test]
async fn global_administrator_manages_every_hospital() {
    let result = manageable_perimeters_handler(
        State(state()),
        Path("4100003".to_owned()),
        Query(ManageablePerimetersQuery { depth: Some(2) }),
    )
    .await;
    assert!(result.is_ok());
    let Json(nodes) = result.unwrap_or_else(|_| unreachable!());

    let hospitals: Vec<&str> = nodes[0]
        .children
        .iter()
        .map(|node| node.name.as_str())
        .collect();
    assert_eq!(hospitals, vec!["Hopital Nord", "Hopital Sud"]);
    let cardiology = &nodes[0].children[1].children[0];
    assert_eq!(cardiology.children.len(), 1);
}

#[tokio::test]
async fn readers_have_no_manageable_perimeters() {
    let result = manageable_perimeters_handler(
        State(state()),
        Path("4100001".to_owned()),
        Query(ManageablePerimetersQuery::default()),
    )
    .await;
    assert!(result.is_ok());
    let Json(nodes) = result.unwrap_or_else(|_| unreachable!());
    assert!(nodes.is_empty());
}

#[tokio::test]
async fn roles_are_listed_with_closed_rights() {
    let Json(roles) = list_roles_handler(State(state())).await;

    assert_eq!(roles.len(), 5);
    assert!(
        roles[0]
            .rights
            .contains(&"right_read_patient_pseudonymized".to_owned())
    );
    assert!(roles[4].is_global);
}
