//! Backend test support utilities
//!
//! Shared by the backend's unit and integration tests: unified logging
//! initialization, unique test data, and a migrated throwaway database.

pub mod db;
pub mod logging;
pub mod unique_helpers;
