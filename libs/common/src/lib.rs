//! Shared infrastructure for the membership service
//!
//! This crate holds the pieces every service-side module needs: the
//! PostgreSQL connection pool, the Redis pool used for session storage,
//! and the shared database error types.

pub mod cache;
pub mod database;
pub mod error;
