//! Infrastructure helpers shared by adapters and services.

pub mod db_errors;
