//! Application services and ports.

#![forbid(unsafe_code)]

mod rights_ports;
mod rights_service;

pub use rights_ports::{GrantRepository, PerimeterRepository};
pub use rights_service::RightsService;
