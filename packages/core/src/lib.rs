// Library root. The binary in `src/main.rs` is the composition root that
// wires these modules together; integration tests in `tests/` use them
// directly.

pub mod db;
pub mod error;
pub mod repository;
pub mod scheduler;
pub mod services;
pub mod store;
pub mod venue;

pub mod cli;
pub mod config;
pub mod logging;
