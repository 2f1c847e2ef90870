//! Integration tests for sqlgate.
//!
//! Pipeline tests run against in-memory doubles and always execute. The
//! live-database tests require a running PostgreSQL instance; set the
//! DATABASE_URL environment variable to enable them.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
