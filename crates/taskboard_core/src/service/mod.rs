//! Command-level entry points.
//!
//! # Responsibility
//! - Parse caller commands into typed requests and validate them.
//! - Route each command to exactly one entity store operation.
//! - Keep CLI/transport layers decoupled from storage details.

pub mod command;
pub mod task_service;
