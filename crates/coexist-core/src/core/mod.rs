//! # Core Module
//!
//! Stateless building blocks shared by the analysis engine and the workflows.
//!
//! - **Data models** ([`models`]) - box records, aggregates, point estimates and state points
//! - **Statistics** ([`stats`]) - sample statistics and least-squares fitting
//! - **File I/O** ([`io`]) - block-average input, fixed-width tables and the CSV report
//!
//! Nothing in this module touches the project layout; paths are always
//! supplied by the caller.

pub mod io;
pub mod models;
pub mod stats;
