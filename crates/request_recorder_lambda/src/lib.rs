//! AWS-oriented adapters and the Lambda handler for request recording.
//!
//! This crate owns runtime integration details (Lambda entry point, DynamoDB
//! item encoding and logging setup) on top of the contract defined in
//! `request_recorder_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod telemetry;
