use std::str::FromStr;

use perimetra_core::AppError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Boolean rights a role can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Right {
    /// Allows reading nominative patient data.
    ReadPatientNominative,
    /// Allows reading pseudonymized patient data.
    ReadPatientPseudonymized,
    /// Allows searching patients by hospital identifier (IPP).
    SearchByIpp,
    /// Allows exporting nominative data as CSV.
    ExportCsvNominative,
    /// Allows exporting pseudonymized data as CSV.
    ExportCsvPseudonymized,
    /// Allows transferring nominative data to a Jupyter workspace.
    TransferJupyterNominative,
    /// Allows transferring pseudonymized data to a Jupyter workspace.
    TransferJupyterPseudonymized,
    /// Allows granting and revoking administration accesses.
    ManageAdminAccesses,
    /// Allows granting and revoking data accesses.
    ManageDataAccesses,
    /// Allows listing administration accesses.
    ReadAdminAccesses,
    /// Allows listing data accesses.
    ReadDataAccesses,
}

impl Right {
    /// Returns all known rights in bit order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Right] = &[
            Right::ReadPatientNominative,
            Right::ReadPatientPseudonymized,
            Right::SearchByIpp,
            Right::ExportCsvNominative,
            Right::ExportCsvPseudonymized,
            Right::TransferJupyterNominative,
            Right::TransferJupyterPseudonymized,
            Right::ManageAdminAccesses,
            Right::ManageDataAccesses,
            Right::ReadAdminAccesses,
            Right::ReadDataAccesses,
        ];

        ALL
    }

    /// Returns a stable storage value for this right.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadPatientNominative => "right_read_patient_nominative",
            Self::ReadPatientPseudonymized => "right_read_patient_pseudonymized",
            Self::SearchByIpp => "right_search_patients_by_ipp",
            Self::ExportCsvNominative => "right_export_csv_nominative",
            Self::ExportCsvPseudonymized => "right_export_csv_pseudonymized",
            Self::TransferJupyterNominative => "right_transfer_jupyter_nominative",
            Self::TransferJupyterPseudonymized => "right_transfer_jupyter_pseudonymized",
            Self::ManageAdminAccesses => "right_manage_admin_accesses",
            Self::ManageDataAccesses => "right_manage_data_accesses",
            Self::ReadAdminAccesses => "right_read_admin_accesses",
            Self::ReadDataAccesses => "right_read_data_accesses",
        }
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl FromStr for Right {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|right| right.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown right value '{value}'")))
    }
}

impl Serialize for Right {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Right {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::from_str(value.as_str()).map_err(serde::de::Error::custom)
    }
}

/// Compact set of rights indexed by [`Right`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RightSet(u16);

impl RightSet {
    /// Rights that grant reading patient data on a perimeter.
    pub const DATA_READ: Self = Self::from_bits(
        Right::ReadPatientNominative.bit()
            | Right::ReadPatientPseudonymized.bit()
            | Right::SearchByIpp.bit(),
    );

    /// Rights evaluated across the whole grant set rather than per perimeter.
    pub const EXPORT_TRANSFER: Self = Self::from_bits(
        Right::ExportCsvNominative.bit()
            | Right::ExportCsvPseudonymized.bit()
            | Right::TransferJupyterNominative.bit()
            | Right::TransferJupyterPseudonymized.bit(),
    );

    const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Creates an empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns whether the right is present.
    #[must_use]
    pub fn contains(&self, right: Right) -> bool {
        self.0 & right.bit() != 0
    }

    /// Adds a right.
    pub fn insert(&mut self, right: Right) {
        self.0 |= right.bit();
    }

    /// Returns whether no right is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns the union of both sets.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns the rights present in both sets.
    #[must_use]
    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Returns whether both sets share at least one right.
    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Iterates over the present rights in bit order.
    pub fn iter(self) -> impl Iterator<Item = Right> {
        Right::all()
            .iter()
            .copied()
            .filter(move |right| self.contains(*right))
    }
}

impl FromIterator<Right> for RightSet {
    fn from_iter<I: IntoIterator<Item = Right>>(iter: I) -> Self {
        let mut set = Self::empty();
        for right in iter {
            set.insert(right);
        }
        set
    }
}

impl Serialize for RightSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for RightSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Vec::<Right>::deserialize(deserializer)?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Right, RightSet};

    #[test]
    fn right_roundtrip_storage_value() {
        let right = Right::TransferJupyterPseudonymized;
        let restored = Right::from_str(right.as_str());
        assert!(restored.is_ok());
        assert_eq!(restored.unwrap_or(Right::SearchByIpp), right);
    }

    #[test]
    fn unknown_right_is_rejected() {
        assert!(Right::from_str("right_fly").is_err());
    }

    #[test]
    fn right_bits_are_distinct() {
        let set: RightSet = Right::all().iter().copied().collect();
        assert_eq!(set.iter().count(), Right::all().len());
    }

    #[test]
    fn data_read_and_export_masks_do_not_overlap() {
        assert!(!RightSet::DATA_READ.intersects(RightSet::EXPORT_TRANSFER));
        assert!(RightSet::DATA_READ.contains(Right::SearchByIpp));
        assert!(!RightSet::DATA_READ.contains(Right::ReadDataAccesses));
    }
}
