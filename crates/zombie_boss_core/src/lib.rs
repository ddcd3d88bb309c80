//! Counter and registration domain for the zombie boss API.
//!
//! This crate owns the record layout, the store contract and the service
//! operations. It intentionally excludes AWS SDK and Lambda runtime concerns;
//! those live in `zombie_boss_lambda`.

pub mod counter;
pub mod error;
pub mod memory;
pub mod records;
pub mod registration;
pub mod store;
pub mod validation;
