//! Repository functions: storage models in, domain values out.

pub mod move_records;
pub mod rounds;
pub mod sessions;
