//! Greenhouse Monitor - climate logging and reporting for greenhouses
//!
//! This library exposes the core modules for testing and reuse.

pub mod analytics;
pub mod charts;
pub mod common;
pub mod config;
pub mod entity;
pub mod error;
pub mod period;
pub mod report;
pub mod routes;
pub mod store;
