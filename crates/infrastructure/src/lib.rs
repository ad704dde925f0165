//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_grant_repository;
mod in_memory_perimeter_repository;
mod seed_document;

pub use in_memory_grant_repository::{InMemoryGrantRepository, StoredAccess};
pub use in_memory_perimeter_repository::InMemoryPerimeterRepository;
pub use seed_document::{SeedDocument, SeedParts};
