//! Organizational units and their fixed level list.

use std::str::FromStr;

use perimetra_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Stable identifier of an organizational unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PerimeterId(i64);

impl PerimeterId {
    /// Creates an identifier from its stored value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the stored value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for PerimeterId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for PerimeterId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| AppError::Validation(format!("invalid perimeter id '{value}'")))
    }
}

/// Hierarchy level of a perimeter, ordered from the root downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerimeterType {
    /// Health group, the single root level.
    Group,
    /// Hospital.
    Hospital,
    /// Clinical department.
    Department,
    /// Care unit.
    Unit,
}

impl PerimeterType {
    /// Ordered level list, root first.
    pub const LEVELS: [Self; 4] = [Self::Group, Self::Hospital, Self::Department, Self::Unit];

    /// Level every parent chain must end at.
    pub const ROOT: Self = Self::Group;

    /// Returns a stable storage value for this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Hospital => "hospital",
            Self::Department => "department",
            Self::Unit => "unit",
        }
    }

    /// Returns whether this is the root level.
    #[must_use]
    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }
}

impl FromStr for PerimeterType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::LEVELS
            .into_iter()
            .find(|level| level.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown perimeter type '{value}'")))
    }
}

/// One organizational unit of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Perimeter {
    id: PerimeterId,
    name: NonEmptyString,
    perimeter_type: PerimeterType,
    parent_id: Option<PerimeterId>,
    above_levels: Vec<PerimeterId>,
    below_levels: Vec<PerimeterId>,
}

impl Perimeter {
    /// Creates a perimeter, enforcing that only the root level has no parent.
    pub fn new(
        id: PerimeterId,
        name: impl Into<String>,
        perimeter_type: PerimeterType,
        parent_id: Option<PerimeterId>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        match (perimeter_type.is_root(), parent_id) {
            (true, Some(parent_id)) => {
                return Err(AppError::Validation(format!(
                    "root perimeter '{id}' cannot have parent '{parent_id}'"
                )));
            }
            (false, None) => {
                return Err(AppError::Validation(format!(
                    "perimeter '{id}' of type '{}' requires a parent",
                    perimeter_type.as_str()
                )));
            }
            _ => {}
        }
        if parent_id == Some(id) {
            return Err(AppError::Validation(format!(
                "perimeter '{id}' cannot be its own parent"
            )));
        }

        Ok(Self {
            id,
            name,
            perimeter_type,
            parent_id,
            above_levels: Vec::new(),
            below_levels: Vec::new(),
        })
    }

    /// Returns the perimeter id.
    #[must_use]
    pub fn id(&self) -> PerimeterId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the hierarchy level.
    #[must_use]
    pub fn perimeter_type(&self) -> PerimeterType {
        self.perimeter_type
    }

    /// Returns the parent id, absent only at the root level.
    #[must_use]
    pub fn parent_id(&self) -> Option<PerimeterId> {
        self.parent_id
    }

    /// Returns ancestor ids, nearest first.
    #[must_use]
    pub fn above_levels(&self) -> &[PerimeterId] {
        &self.above_levels
    }

    /// Returns descendant ids in breadth-first order.
    #[must_use]
    pub fn below_levels(&self) -> &[PerimeterId] {
        &self.below_levels
    }

    /// Returns whether this perimeter sits at the root level.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.perimeter_type.is_root()
    }

    pub(crate) fn set_levels(&mut self, above: Vec<PerimeterId>, below: Vec<PerimeterId>) {
        self.above_levels = above;
        self.below_levels = below;
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Perimeter, PerimeterId, PerimeterType};

    #[test]
    fn root_perimeter_rejects_parent() {
        let result = Perimeter::new(
            PerimeterId::new(2),
            "APHP",
            PerimeterType::Group,
            Some(PerimeterId::new(1)),
        );
        assert!(result.is_err());
    }

    #[test]
    fn non_root_perimeter_requires_parent() {
        let result = Perimeter::new(PerimeterId::new(2), "Nord", PerimeterType::Hospital, None);
        assert!(result.is_err());
    }

    #[test]
    fn perimeter_type_roundtrip_storage_value() {
        for level in PerimeterType::LEVELS {
            let restored = PerimeterType::from_str(level.as_str());
            assert!(restored.is_ok());
            assert_eq!(restored.unwrap_or(PerimeterType::Unit), level);
        }
    }

    #[test]
    fn perimeter_id_parses_trimmed_values() {
        let parsed = PerimeterId::from_str(" 42 ");
        assert!(parsed.is_ok());
        assert_eq!(parsed.unwrap_or(PerimeterId::new(0)), PerimeterId::new(42));
        assert!(PerimeterId::from_str("4x").is_err());
    }
}
