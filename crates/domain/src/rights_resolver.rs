//! Effective data-access rights per perimeter.
//!
//! Each requested perimeter is walked upwards along its rooted chain. Entries
//! met on the way are kept in an `impacted` list, descendant first, and the
//! accumulation policy is applied every time a new ancestor is reached:
//!
//! - default: an ancestor holding a read right ORs its rights into every
//!   impacted descendant;
//! - pop: an ancestor sharing a read right with an impacted descendant
//!   supersedes it, and the descendant leaves the result set.
//!
//! A walk stops at the first perimeter already resolved by an earlier chain,
//! after applying the policy with that resolved entry. In pop mode this makes
//! the outcome depend on chain order when an intermediate perimeter was
//! resolved before an ancestor sharing a right with a deeper one.
//!
//! Export and transfer rights are not perimeter-scoped: they are computed
//! over the whole grant set and stamped onto every returned entry.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::{AccessGrantSet, DataRight, PerimeterId, RightSet, RootedPerimeters};

/// Computes one [`DataRight`] per surviving requested perimeter.
///
/// `rooted` must be the output of [`crate::rootify`] for `required`.
/// Entries are returned sorted by perimeter id.
#[must_use]
pub fn resolve_data_rights(
    required: &[PerimeterId],
    grants: &AccessGrantSet,
    rooted: &RootedPerimeters,
    pop_previous_rights: bool,
) -> Vec<DataRight> {
    let required: HashSet<PerimeterId> = required.iter().copied().collect();
    let mut resolution = Resolution {
        entries: Vec::new(),
        results: HashMap::new(),
        pop_previous_rights,
    };

    for chain in rooted.chains() {
        let mut impacted = Vec::new();
        let last = chain.links().len().saturating_sub(1);
        for (position, perimeter_id) in chain.links().iter().enumerate() {
            if let Some(existing) = resolution.results.get(perimeter_id).copied() {
                resolution.accumulate(existing, &mut impacted);
                break;
            }

            let mut right = DataRight::new(*perimeter_id);
            for grant in grants
                .iter()
                .filter(|grant| grant.applies_at(*perimeter_id, position == last))
            {
                right.absorb_grant(grant);
            }

            let slot = resolution.entries.len();
            resolution.entries.push(right);
            if required.contains(perimeter_id) {
                resolution.results.insert(*perimeter_id, slot);
            }
            resolution.accumulate(slot, &mut impacted);
            impacted.push(slot);
        }
    }

    resolution.finish(grants)
}

struct Resolution {
    entries: Vec<DataRight>,
    results: HashMap<PerimeterId, usize>,
    pop_previous_rights: bool,
}

impl Resolution {
    fn accumulate(&mut self, current: usize, impacted: &mut Vec<usize>) {
        if self.pop_previous_rights {
            let ancestor = self.entries[current].clone();
            impacted.retain(|entry| {
                let descendant = &self.entries[*entry];
                if !ancestor.shares_data_read_right(descendant) {
                    return true;
                }
                let perimeter_id = descendant.perimeter_id();
                if self.results.get(&perimeter_id) == Some(entry) {
                    self.results.remove(&perimeter_id);
                }
                false
            });
        } else if self.entries[current].has_data_read_right() {
            let ancestor = self.entries[current].clone();
            for entry in impacted.iter() {
                self.entries[*entry].inherit_from(&ancestor);
            }
        }
    }

    fn finish(self, grants: &AccessGrantSet) -> Vec<DataRight> {
        let mut export_rights = RightSet::empty();
        let mut export_access_ids = BTreeSet::new();
        for grant in grants.iter() {
            let rights = grant.role().rights().intersection(RightSet::EXPORT_TRANSFER);
            if !rights.is_empty() {
                export_rights = export_rights.union(rights);
                export_access_ids.insert(grant.access_id());
            }
        }

        let mut slots: Vec<(PerimeterId, usize)> = self.results.into_iter().collect();
        slots.sort_unstable();
        let mut entries: Vec<Option<DataRight>> = self.entries.into_iter().map(Some).collect();
        slots
            .into_iter()
            .filter_map(|(_, slot)| entries.get_mut(slot).and_then(Option::take))
            .map(|mut right| {
                right.stamp_export_rights(export_rights, &export_access_ids);
                right
            })
            .collect()
    }
}
