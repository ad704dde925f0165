//! Perimeters a user may administer through management-scoped grants.

use std::collections::BTreeSet;

use crate::{AccessGrantSet, Perimeter, PerimeterId, PerimeterTree, ResolutionError};

/// Returns every perimeter the user may administer.
///
/// A same-level grant covers its perimeter and everything below it, but only
/// when the perimeter has children. An inferior-levels grant covers strict
/// descendants only.
pub fn manageable_perimeter_ids(
    grants: &AccessGrantSet,
    tree: &PerimeterTree,
) -> Result<BTreeSet<PerimeterId>, ResolutionError> {
    let mut manageable = BTreeSet::new();
    for grant in grants.managers() {
        for anchor in grant.anchors(tree)? {
            let perimeter = tree.require(anchor)?;
            let role = grant.role();
            if role.editable_same_level() && tree.has_children(anchor) {
                manageable.insert(perimeter.id());
                manageable.extend(perimeter.below_levels().iter().copied());
            }
            if role.editable_inferior_levels() {
                manageable.extend(perimeter.below_levels().iter().copied());
            }
        }
    }

    Ok(manageable)
}

/// Returns the topmost manageable perimeters, ordered by id.
pub fn manageable_perimeters(
    grants: &AccessGrantSet,
    tree: &PerimeterTree,
) -> Result<Vec<Perimeter>, ResolutionError> {
    let manageable = manageable_perimeter_ids(grants, tree)?;
    Ok(manageable
        .iter()
        .filter_map(|id| tree.get(*id))
        .filter(|perimeter| {
            perimeter
                .parent_id()
                .is_none_or(|parent_id| !manageable.contains(&parent_id))
        })
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{manageable_perimeter_ids, manageable_perimeters};
    use crate::test_support::{
        FULL_MANAGER, INFERIOR_LEVELS_MANAGER, NOMINATIVE_READER, SAME_LEVEL_MANAGER, access,
        aphp, dept_a, grant_set, hospital_1, hospital_2, sample_tree,
    };
    use crate::{AccessGrant, Perimeter, PerimeterId, ResolutionError};

    fn tops(grants: &[AccessGrant]) -> Vec<PerimeterId> {
        let result = manageable_perimeters(&grant_set(grants), &sample_tree());
        assert!(result.is_ok());
        result
            .unwrap_or_default()
            .iter()
            .map(Perimeter::id)
            .collect()
    }

    #[test]
    fn same_level_grant_covers_a_perimeter_with_children() {
        assert_eq!(
            tops(&[access(1, SAME_LEVEL_MANAGER, hospital_2())]),
            vec![hospital_2()]
        );
    }

    #[test]
    fn same_level_grant_on_a_leaf_covers_nothing() {
        assert!(tops(&[access(1, SAME_LEVEL_MANAGER, hospital_1())]).is_empty());
    }

    #[test]
    fn inferior_levels_grant_excludes_its_own_perimeter() {
        assert_eq!(
            tops(&[access(1, INFERIOR_LEVELS_MANAGER, hospital_2())]),
            vec![dept_a()]
        );
    }

    #[test]
    fn both_scopes_collapse_to_the_grant_perimeter() {
        assert_eq!(
            tops(&[access(1, FULL_MANAGER, hospital_2())]),
            vec![hospital_2()]
        );
    }

    #[test]
    fn inferior_levels_on_root_returns_its_direct_children() {
        assert_eq!(
            tops(&[access(1, INFERIOR_LEVELS_MANAGER, aphp())]),
            vec![hospital_1(), hospital_2()]
        );

        let all = manageable_perimeter_ids(
            &grant_set(&[access(1, INFERIOR_LEVELS_MANAGER, aphp())]),
            &sample_tree(),
        );
        assert!(all.is_ok());
        assert!(all.unwrap_or_default().contains(&dept_a()));
    }

    #[test]
    fn reader_roles_manage_nothing() {
        assert!(tops(&[access(1, NOMINATIVE_READER, aphp())]).is_empty());
    }

    #[test]
    fn grant_on_unknown_perimeter_is_an_integrity_violation() {
        let result = manageable_perimeter_ids(
            &grant_set(&[access(1, FULL_MANAGER, PerimeterId::new(42))]),
            &sample_tree(),
        );
        assert!(matches!(
            result,
            Err(ResolutionError::DanglingGrant { perimeter_id, .. })
                if perimeter_id == PerimeterId::new(42)
        ));
        assert!(result.is_err_and(|error| error.is_integrity_violation()));
    }
}
