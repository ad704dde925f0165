//! Domain entities, invariants and the rights resolution engine.
//!
//! Every function here is pure over immutable inputs. Hierarchy and role
//! snapshots can be shared behind an `Arc` by concurrent resolutions.

#![forbid(unsafe_code)]

mod access;
mod data_right;
mod error;
mod manageable;
mod perimeter;
mod perimeter_tree;
mod rights;
mod rights_resolver;
mod role_catalog;
mod rootify;
mod tree_shaper;

#[cfg(test)]
mod test_support;

pub use access::{AccessGrant, AccessGrantSet, AccessId, ProfileId, ScopedGrant};
pub use data_right::DataRight;
pub use error::ResolutionError;
pub use manageable::{manageable_perimeter_ids, manageable_perimeters};
pub use perimeter::{Perimeter, PerimeterId, PerimeterType};
pub use perimeter_tree::PerimeterTree;
pub use rights::{Right, RightSet};
pub use rights_resolver::resolve_data_rights;
pub use role_catalog::{RightDependencies, Role, RoleCatalog, RoleId};
pub use rootify::{RootedChain, RootedPerimeters, rootify};
pub use tree_shaper::{PerimeterNode, shape};
