//! zoo-reports - reporting layer over the zoo-management database.
//!
//! This library exposes the core modules for the `zoo` binary and for use in
//! integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod report;
pub mod server;
