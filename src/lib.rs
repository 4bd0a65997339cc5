// Library interface for testing

pub mod auth;
pub mod backend;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod pages;
pub mod queries;
pub mod runs;
pub mod schema;
pub mod serve;
pub mod stats;
pub mod timefmt;

#[cfg(test)]
mod test_utils;

// Re-export the expected database version for convenience
pub use constants::EXPECTED_DB_VERSION;
