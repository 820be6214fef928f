// Library root: re-exports all modules so integration tests and the binary
// share one public API.

pub mod config;
pub mod evaluator;
pub mod input;
pub mod position;
pub mod report;
pub mod roster;
pub mod session;
pub mod store;
