//! AWS-oriented adapters and the API Gateway handler for the zombie boss API.
//!
//! This crate owns runtime integration details (Lambda entry point, DynamoDB
//! adapter, environment configuration) on top of the domain operations in
//! `zombie_boss_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod telemetry;
