//! Read-only snapshot of the organizational hierarchy.
//!
//! Perimeters live in a flat arena; parents are stored as ids and resolved
//! through the id index on demand, so the snapshot can be shared across
//! threads behind an `Arc` without reference cycles.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::{Perimeter, PerimeterId, PerimeterType, ResolutionError};

/// Immutable, validated hierarchy snapshot.
#[derive(Debug, Clone, Default)]
pub struct PerimeterTree {
    perimeters: Vec<Perimeter>,
    index: HashMap<PerimeterId, usize>,
    children: HashMap<PerimeterId, Vec<PerimeterId>>,
}

impl PerimeterTree {
    /// Builds a snapshot and recomputes the ancestor and descendant lists.
    pub fn new(perimeters: Vec<Perimeter>) -> Result<Self, ResolutionError> {
        let mut index = HashMap::with_capacity(perimeters.len());
        for (position, perimeter) in perimeters.iter().enumerate() {
            if index.insert(perimeter.id(), position).is_some() {
                return Err(ResolutionError::DuplicatePerimeter(perimeter.id()));
            }
        }

        let mut children: HashMap<PerimeterId, Vec<PerimeterId>> = HashMap::new();
        for perimeter in &perimeters {
            if let Some(parent_id) = perimeter.parent_id() {
                if !index.contains_key(&parent_id) {
                    return Err(ResolutionError::MissingAncestor {
                        perimeter_id: perimeter.id(),
                        parent_id,
                    });
                }
                children.entry(parent_id).or_default().push(perimeter.id());
            }
        }
        for siblings in children.values_mut() {
            siblings.sort();
        }

        let mut tree = Self {
            perimeters,
            index,
            children,
        };

        let mut levels = Vec::with_capacity(tree.perimeters.len());
        for perimeter in &tree.perimeters {
            let above = tree.walk_ancestors(perimeter)?;
            let below = tree.descendants(perimeter.id());
            levels.push((above, below));
        }
        for (perimeter, (above, below)) in tree.perimeters.iter_mut().zip(levels) {
            perimeter.set_levels(above, below);
        }

        Ok(tree)
    }

    /// Returns the number of perimeters in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.perimeters.len()
    }

    /// Returns whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.perimeters.is_empty()
    }

    /// Returns a perimeter by id.
    #[must_use]
    pub fn get(&self, id: PerimeterId) -> Option<&Perimeter> {
        self.index
            .get(&id)
            .and_then(|position| self.perimeters.get(*position))
    }

    /// Returns a perimeter by id or fails with `UnknownPerimeter`.
    pub fn require(&self, id: PerimeterId) -> Result<&Perimeter, ResolutionError> {
        self.get(id).ok_or(ResolutionError::UnknownPerimeter(id))
    }

    /// Returns whether the perimeter exists.
    #[must_use]
    pub fn contains(&self, id: PerimeterId) -> bool {
        self.index.contains_key(&id)
    }

    /// Iterates over all perimeters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Perimeter> {
        self.perimeters.iter()
    }

    /// Returns the root-level perimeters.
    pub fn roots(&self) -> impl Iterator<Item = &Perimeter> {
        self.perimeters.iter().filter(|perimeter| perimeter.is_root())
    }

    /// Returns the direct children ids, sorted.
    #[must_use]
    pub fn children_of(&self, id: PerimeterId) -> &[PerimeterId] {
        self.children
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns whether the perimeter has at least one child.
    #[must_use]
    pub fn has_children(&self, id: PerimeterId) -> bool {
        !self.children_of(id).is_empty()
    }

    /// Returns ancestor ids, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: PerimeterId) -> &[PerimeterId] {
        self.get(id)
            .map(Perimeter::above_levels)
            .unwrap_or_default()
    }

    /// Returns descendant ids in breadth-first order.
    #[must_use]
    pub fn descendants(&self, id: PerimeterId) -> Vec<PerimeterId> {
        self.descendants_within(id, usize::MAX)
    }

    /// Returns whether `ancestor` is a strict ancestor of `perimeter`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: PerimeterId, perimeter: PerimeterId) -> bool {
        self.ancestors(perimeter).contains(&ancestor)
    }

    /// Returns the given perimeters together with their full ancestor chains.
    pub fn with_ancestors(&self, ids: &[PerimeterId]) -> Result<Vec<Perimeter>, ResolutionError> {
        let mut wanted = BTreeSet::new();
        for id in ids {
            let perimeter = self.require(*id)?;
            wanted.insert(perimeter.id());
            wanted.extend(perimeter.above_levels().iter().copied());
        }

        Ok(self.collect(wanted))
    }

    /// Returns the given perimeters and their descendants down to `depth` levels.
    pub fn children_within(
        &self,
        ids: &[PerimeterId],
        depth: usize,
    ) -> Result<Vec<Perimeter>, ResolutionError> {
        let mut wanted = BTreeSet::new();
        for id in ids {
            self.require(*id)?;
            wanted.insert(*id);
            wanted.extend(self.descendants_within(*id, depth));
        }

        Ok(self.collect(wanted))
    }

    fn collect(&self, ids: BTreeSet<PerimeterId>) -> Vec<Perimeter> {
        ids.into_iter()
            .filter_map(|id| self.get(id).cloned())
            .collect()
    }

    fn descendants_within(&self, id: PerimeterId, depth: usize) -> Vec<PerimeterId> {
        let mut found = Vec::new();
        let mut queue = VecDeque::from([(id, 0_usize)]);
        while let Some((current, level)) = queue.pop_front() {
            if level >= depth {
                continue;
            }
            for child in self.children_of(current) {
                found.push(*child);
                queue.push_back((*child, level + 1));
            }
        }
        found
    }

    fn walk_ancestors(&self, perimeter: &Perimeter) -> Result<Vec<PerimeterId>, ResolutionError> {
        let max_hops = PerimeterType::LEVELS.len();
        let corrupt = |hops| ResolutionError::CorruptHierarchy {
            perimeter_id: perimeter.id(),
            hops,
        };

        let mut above = Vec::new();
        let mut seen = HashSet::from([perimeter.id()]);
        let mut current = perimeter;
        while !current.is_root() {
            let Some(parent_id) = current.parent_id() else {
                return Err(corrupt(above.len()));
            };
            if above.len() >= max_hops || !seen.insert(parent_id) {
                return Err(corrupt(above.len()));
            }
            above.push(parent_id);
            current = self.get(parent_id).ok_or(ResolutionError::MissingAncestor {
                perimeter_id: current.id(),
                parent_id,
            })?;
        }
        if current.parent_id().is_some() {
            return Err(corrupt(above.len()));
        }

        Ok(above)
    }
}
