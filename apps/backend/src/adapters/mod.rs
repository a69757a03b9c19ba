//! Adapters for external dependencies.

pub mod move_records_sea;
pub mod rounds_sea;
pub mod sessions_sea;
