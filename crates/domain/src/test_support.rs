use chrono::{Duration, Utc};
use proptest::prelude::*;
use proptest::sample::Index;

use crate::{
    AccessGrant, AccessGrantSet, AccessId, Perimeter, PerimeterId, PerimeterTree, PerimeterType,
    ProfileId, Right, RightDependencies, Role, RoleCatalog, RoleId,
};

pub(crate) const NOMINATIVE_READER: RoleId = RoleId::new(1);
pub(crate) const PSEUDO_READER: RoleId = RoleId::new(2);
pub(crate) const SAME_LEVEL_MANAGER: RoleId = RoleId::new(3);
pub(crate) const INFERIOR_LEVELS_MANAGER: RoleId = RoleId::new(4);
pub(crate) const FULL_MANAGER: RoleId = RoleId::new(5);
pub(crate) const EXPORTER: RoleId = RoleId::new(6);
pub(crate) const GLOBAL_READER: RoleId = RoleId::new(7);
pub(crate) const UNKNOWN_ROLE: RoleId = RoleId::new(99);

pub(crate) fn aphp() -> PerimeterId {
    PerimeterId::new(1)
}

pub(crate) fn hospital_1() -> PerimeterId {
    PerimeterId::new(2)
}

pub(crate) fn hospital_2() -> PerimeterId {
    PerimeterId::new(3)
}

pub(crate) fn dept_a() -> PerimeterId {
    PerimeterId::new(4)
}

pub(crate) fn perimeter(
    id: i64,
    name: &str,
    perimeter_type: PerimeterType,
    parent_id: Option<i64>,
) -> Perimeter {
    Perimeter::new(
        PerimeterId::new(id),
        name,
        perimeter_type,
        parent_id.map(PerimeterId::new),
    )
    .unwrap_or_else(|error| panic!("invalid perimeter fixture {id}: {error}"))
}

/// APHP -> {Hospital 1, Hospital 2}, Hospital 2 -> {Department A}.
pub(crate) fn sample_tree() -> PerimeterTree {
    PerimeterTree::new(vec![
        perimeter(1, "APHP", PerimeterType::Group, None),
        perimeter(2, "Hospital 1", PerimeterType::Hospital, Some(1)),
        perimeter(3, "Hospital 2", PerimeterType::Hospital, Some(1)),
        perimeter(4, "Department A", PerimeterType::Department, Some(3)),
    ])
    .unwrap_or_else(|error| panic!("invalid sample tree: {error}"))
}

fn role(id: RoleId, name: &str, rights: &[Right]) -> Role {
    Role::new(id, name, rights.iter().copied())
        .unwrap_or_else(|error| panic!("invalid role fixture {id}: {error}"))
}

pub(crate) fn sample_roles() -> Vec<Role> {
    vec![
        role(NOMINATIVE_READER, "Nominative reader", &[Right::ReadPatientNominative]),
        role(PSEUDO_READER, "Pseudonymized reader", &[Right::ReadPatientPseudonymized]),
        role(SAME_LEVEL_MANAGER, "Local manager", &[Right::ManageDataAccesses])
            .editing_same_level(),
        role(INFERIOR_LEVELS_MANAGER, "Lower manager", &[Right::ManageDataAccesses])
            .editing_inferior_levels(),
        role(FULL_MANAGER, "Full manager", &[Right::ManageDataAccesses])
            .editing_same_level()
            .editing_inferior_levels(),
        role(
            EXPORTER,
            "Exporter",
            &[Right::ExportCsvPseudonymized, Right::TransferJupyterPseudonymized],
        ),
        role(GLOBAL_READER, "Global reader", &[Right::ReadPatientPseudonymized]).global(),
    ]
}

pub(crate) fn sample_catalog() -> RoleCatalog {
    RoleCatalog::new(sample_roles(), &RightDependencies::default())
        .unwrap_or_else(|error| panic!("invalid catalog fixture: {error}"))
}

pub(crate) fn access(id: i64, role_id: RoleId, perimeter_id: PerimeterId) -> AccessGrant {
    let now = Utc::now();
    AccessGrant::new(
        AccessId::new(id),
        ProfileId::new(1),
        role_id,
        perimeter_id,
        now - Duration::days(1),
        now + Duration::days(365),
    )
    .unwrap_or_else(|error| panic!("invalid access fixture {id}: {error}"))
}

pub(crate) fn grant_set_with(catalog: &RoleCatalog, grants: &[AccessGrant]) -> AccessGrantSet {
    AccessGrantSet::build(grants, catalog, Utc::now())
        .unwrap_or_else(|error| panic!("invalid grant fixture: {error}"))
}

pub(crate) fn grant_set(grants: &[AccessGrant]) -> AccessGrantSet {
    grant_set_with(&sample_catalog(), grants)
}

/// Random well-formed hierarchies rooted at perimeter 1.
pub(crate) fn generated_tree() -> impl Strategy<Value = PerimeterTree> {
    proptest::collection::vec(any::<Index>(), 0..24).prop_map(|picks| {
        let mut perimeters = vec![perimeter(1, "root", PerimeterType::Group, None)];
        let mut levels = vec![0_usize];
        for (offset, pick) in picks.iter().enumerate() {
            let candidates: Vec<usize> = (0..perimeters.len())
                .filter(|position| levels[*position] + 1 < PerimeterType::LEVELS.len())
                .collect();
            let parent = candidates[pick.index(candidates.len())];
            let level = levels[parent] + 1;
            let id = i64::try_from(offset + 2).unwrap_or(i64::MAX);
            let parent_id = perimeters[parent].id().value();
            perimeters.push(perimeter(
                id,
                &format!("perimeter {id}"),
                PerimeterType::LEVELS[level],
                Some(parent_id),
            ));
            levels.push(level);
        }
        PerimeterTree::new(perimeters).unwrap_or_default()
    })
}
