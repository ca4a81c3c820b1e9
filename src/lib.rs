// almost everything lives in the library crate, keeping only the entrypoint
// in src/main.rs; this is what lets the integration tests in tests/api spawn
// the real application in-process.

pub mod authorization;
pub mod configuration;
pub mod domain;
pub mod routes;
pub mod startup;
pub mod telemetry;
