//! Shared request recorder primitives.
//!
//! This crate owns the record/response contract and record id derivation. It
//! intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod contract;
pub mod record_id;
