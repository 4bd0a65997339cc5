//! SQL builders for the local backend's SQLite schema.

pub mod ddl;
pub mod metadata;
pub mod runners;
pub mod runs;
pub mod sessions;
pub mod users;
