//! uibench workspace-level test utilities.
//!
//! This crate exists solely to support workspace-level integration tests,
//! particularly the BDD/cucumber tests in `tests/cucumber.rs`.
//!
//! The actual uibench functionality is in the workspace member crates:
//! - `uibench-types`: Shared contracts and JSON schemas
//! - `uibench-domain`: Statistics, color scale, result set and table builder
//! - `uibench-adapters`: Message source and bundle probing
//! - `uibench-app`: Session, renderers and other use cases
//! - `uibench` (uibench-cli): CLI interface
