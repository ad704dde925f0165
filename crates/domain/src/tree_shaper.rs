//! Nesting of flat perimeter selections for presentation.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{Perimeter, PerimeterId, PerimeterTree, PerimeterType, ResolutionError};

/// Perimeter with its nested, depth-bounded children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerimeterNode {
    /// Perimeter id.
    pub id: PerimeterId,
    /// Display name.
    pub name: String,
    /// Hierarchy level.
    pub perimeter_type: PerimeterType,
    /// Nested children, sorted by name.
    pub children: Vec<PerimeterNode>,
}

impl PerimeterNode {
    /// Returns the number of nodes in this subtree, itself included.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// Nests `flat` under the ancestors needed to connect it to the roots.
///
/// Added ancestors do not count against `max_depth`. Input perimeters with
/// no input ancestor are always shown; below them, at most `max_depth`
/// levels of input descendants are kept, and a descendant reachable only
/// through a perimeter missing from `flat` is dropped.
pub fn shape(
    flat: &[Perimeter],
    tree: &PerimeterTree,
    max_depth: usize,
) -> Result<Vec<PerimeterNode>, ResolutionError> {
    let mut selected = BTreeSet::new();
    let mut closure = BTreeSet::new();
    for perimeter in flat {
        let known = tree.require(perimeter.id())?;
        selected.insert(known.id());
        closure.insert(known.id());
        closure.extend(known.above_levels().iter().copied());
    }

    let shaper = Shaper {
        tree,
        selected: &selected,
        closure: &closure,
        max_depth,
    };
    let tops: Vec<PerimeterId> = closure
        .iter()
        .copied()
        .filter(|id| {
            tree.get(*id)
                .and_then(Perimeter::parent_id)
                .is_none_or(|parent_id| !closure.contains(&parent_id))
        })
        .collect();

    Ok(shaper.nodes(&tops, None))
}

struct Shaper<'a> {
    tree: &'a PerimeterTree,
    selected: &'a BTreeSet<PerimeterId>,
    closure: &'a BTreeSet<PerimeterId>,
    max_depth: usize,
}

impl Shaper<'_> {
    fn nodes(&self, ids: &[PerimeterId], remaining: Option<usize>) -> Vec<PerimeterNode> {
        let mut nodes: Vec<PerimeterNode> = ids
            .iter()
            .filter(|id| self.closure.contains(*id))
            .filter_map(|id| self.node(*id, remaining))
            .collect();
        nodes.sort_by(|left, right| left.name.cmp(&right.name).then(left.id.cmp(&right.id)));
        nodes
    }

    // `remaining` is None until the walk meets its first selected perimeter.
    fn node(&self, id: PerimeterId, remaining: Option<usize>) -> Option<PerimeterNode> {
        let perimeter = self.tree.get(id)?;
        let is_selected = self.selected.contains(&id);
        let below = match (is_selected, remaining) {
            (true, None) => Some(self.max_depth),
            (true, Some(0)) | (false, Some(_)) => return None,
            (true, Some(levels)) => Some(levels - 1),
            (false, None) => None,
        };

        let children = self.nodes(self.tree.children_of(id), below);
        if !is_selected && children.is_empty() {
            return None;
        }

        Some(PerimeterNode {
            id,
            name: perimeter.name().to_owned(),
            perimeter_type: perimeter.perimeter_type(),
            children,
        })
    }
}
