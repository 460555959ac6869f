pub mod backend;
pub mod schema;
pub mod sweeper;
pub mod usage;
pub mod windows;

pub use backend::DuckDbBackend;

/// Re-export the `duckdb` crate so consumers (especially tests) can use
/// `botmeter_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;
