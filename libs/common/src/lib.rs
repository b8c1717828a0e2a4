//! Common library for the bulletin application
//!
//! This crate provides shared functionality used by the bulletin service:
//! database configuration and pooling, schema setup, and error handling.

pub mod database;
pub mod error;
