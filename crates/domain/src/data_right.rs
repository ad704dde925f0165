use std::collections::BTreeSet;

use serde::Serialize;

use crate::{AccessId, PerimeterId, Right, RightSet, ScopedGrant};

/// Effective data-access rights of one user on one perimeter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataRight {
    perimeter_id: PerimeterId,
    access_ids: BTreeSet<AccessId>,
    rights: RightSet,
}

impl DataRight {
    /// Creates an entry carrying no right.
    #[must_use]
    pub fn new(perimeter_id: PerimeterId) -> Self {
        Self {
            perimeter_id,
            access_ids: BTreeSet::new(),
            rights: RightSet::empty(),
        }
    }

    /// Returns the perimeter this entry describes.
    #[must_use]
    pub fn perimeter_id(&self) -> PerimeterId {
        self.perimeter_id
    }

    /// Returns the accesses that contributed to this entry.
    #[must_use]
    pub fn access_ids(&self) -> &BTreeSet<AccessId> {
        &self.access_ids
    }

    /// Returns the effective rights.
    #[must_use]
    pub fn rights(&self) -> RightSet {
        self.rights
    }

    /// Returns whether the right is effective.
    #[must_use]
    pub fn has(&self, right: Right) -> bool {
        self.rights.contains(right)
    }

    /// Returns whether nominative patient data can be read.
    #[must_use]
    pub fn read_nominative(&self) -> bool {
        self.has(Right::ReadPatientNominative)
    }

    /// Returns whether pseudonymized patient data can be read.
    #[must_use]
    pub fn read_pseudonymized(&self) -> bool {
        self.has(Right::ReadPatientPseudonymized)
    }

    /// Returns whether patients can be searched by IPP.
    #[must_use]
    pub fn search_by_ipp(&self) -> bool {
        self.has(Right::SearchByIpp)
    }

    /// Returns whether nominative CSV export is allowed.
    #[must_use]
    pub fn export_csv_nominative(&self) -> bool {
        self.has(Right::ExportCsvNominative)
    }

    /// Returns whether pseudonymized CSV export is allowed.
    #[must_use]
    pub fn export_csv_pseudonymized(&self) -> bool {
        self.has(Right::ExportCsvPseudonymized)
    }

    /// Returns whether nominative Jupyter transfer is allowed.
    #[must_use]
    pub fn transfer_jupyter_nominative(&self) -> bool {
        self.has(Right::TransferJupyterNominative)
    }

    /// Returns whether pseudonymized Jupyter transfer is allowed.
    #[must_use]
    pub fn transfer_jupyter_pseudonymized(&self) -> bool {
        self.has(Right::TransferJupyterPseudonymized)
    }

    /// Returns whether any patient-data read right is effective.
    #[must_use]
    pub fn has_data_read_right(&self) -> bool {
        self.rights.intersects(RightSet::DATA_READ)
    }

    /// Returns whether both entries hold at least one common read right.
    #[must_use]
    pub fn shares_data_read_right(&self, other: &Self) -> bool {
        self.rights
            .intersection(other.rights)
            .intersects(RightSet::DATA_READ)
    }

    /// Folds the perimeter-local rights of a grant into this entry.
    pub fn absorb_grant(&mut self, grant: &ScopedGrant) {
        self.access_ids.insert(grant.access_id());
        self.rights = self
            .rights
            .union(grant.role().rights().intersection(RightSet::DATA_READ));
    }

    /// ORs the rights and contributing accesses of another entry into this one.
    pub fn inherit_from(&mut self, other: &Self) {
        self.access_ids.extend(other.access_ids.iter().copied());
        self.rights = self.rights.union(other.rights);
    }

    pub(crate) fn stamp_export_rights(
        &mut self,
        rights: RightSet,
        access_ids: &BTreeSet<AccessId>,
    ) {
        self.rights = self
            .rights
            .union(rights.intersection(RightSet::EXPORT_TRANSFER));
        self.access_ids.extend(access_ids.iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::DataRight;
    use crate::PerimeterId;

    #[test]
    fn fresh_entry_carries_nothing() {
        let right = DataRight::new(PerimeterId::new(4));
        assert!(!right.has_data_read_right());
        assert!(right.access_ids().is_empty());
        assert!(!right.shares_data_read_right(&right));
    }

    #[test]
    fn serializes_rights_by_storage_name() {
        let right = DataRight::new(PerimeterId::new(4));
        let json = serde_json::to_value(&right);
        assert!(json.is_ok());
        let json = json.unwrap_or_default();
        assert_eq!(json["perimeter_id"], 4);
        assert_eq!(json["rights"], serde_json::json!([]));
    }
}
