//! Reshapes a flat perimeter list into ancestor chains anchored at root ids.

use std::collections::{HashMap, HashSet};

use crate::{Perimeter, PerimeterId, PerimeterType, ResolutionError};

/// Upward chain from a requested perimeter to its root-level ancestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootedChain {
    links: Vec<PerimeterId>,
}

impl RootedChain {
    /// Returns the root-level perimeter ending the chain.
    #[must_use]
    pub fn root(&self) -> PerimeterId {
        self.links[self.links.len() - 1]
    }

    /// Returns the chain, starting perimeter first.
    #[must_use]
    pub fn links(&self) -> &[PerimeterId] {
        &self.links
    }
}

/// Chains produced for a set of root ids, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootedPerimeters {
    chains: Vec<RootedChain>,
}

impl RootedPerimeters {
    /// Returns the chains in request order.
    #[must_use]
    pub fn chains(&self) -> &[RootedChain] {
        &self.chains
    }

    /// Returns the number of chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns whether no chain was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// Links every root id to its ancestors found in `perimeters`.
///
/// `perimeters` must already contain the full ancestor chain of each root
/// id; a dangling parent reference is reported as `MissingAncestor`.
pub fn rootify(
    perimeters: &[Perimeter],
    root_ids: &[PerimeterId],
) -> Result<RootedPerimeters, ResolutionError> {
    let by_id: HashMap<PerimeterId, &Perimeter> = perimeters
        .iter()
        .map(|perimeter| (perimeter.id(), perimeter))
        .collect();
    let mut resolved: HashMap<PerimeterId, Vec<PerimeterId>> = HashMap::new();
    let mut requested = HashSet::new();
    let mut chains = Vec::with_capacity(root_ids.len());

    for root_id in root_ids {
        if !requested.insert(*root_id) {
            continue;
        }
        let start = by_id
            .get(root_id)
            .copied()
            .ok_or(ResolutionError::UnknownPerimeter(*root_id))?;
        let links = link_upwards(start, &by_id, &resolved)?;
        resolved.insert(*root_id, links.clone());
        chains.push(RootedChain { links });
    }

    Ok(RootedPerimeters { chains })
}

fn link_upwards(
    start: &Perimeter,
    by_id: &HashMap<PerimeterId, &Perimeter>,
    resolved: &HashMap<PerimeterId, Vec<PerimeterId>>,
) -> Result<Vec<PerimeterId>, ResolutionError> {
    let max_hops = PerimeterType::LEVELS.len();
    let corrupt = |hops| ResolutionError::CorruptHierarchy {
        perimeter_id: start.id(),
        hops,
    };

    let mut links = vec![start.id()];
    let mut seen = HashSet::from([start.id()]);
    let mut current = start;
    while !current.is_root() {
        let parent_id = current.parent_id().ok_or_else(|| corrupt(links.len() - 1))?;
        if let Some(suffix) = resolved.get(&parent_id) {
            links.extend_from_slice(suffix);
            break;
        }
        if links.len() > max_hops || !seen.insert(parent_id) {
            return Err(corrupt(links.len() - 1));
        }
        current = by_id
            .get(&parent_id)
            .copied()
            .ok_or(ResolutionError::MissingAncestor {
                perimeter_id: current.id(),
                parent_id,
            })?;
        links.push(parent_id);
    }

    if links.len() - 1 > max_hops {
        return Err(corrupt(links.len() - 1));
    }
    Ok(links)
}
