//! # Engine Module
//!
//! The statistical reduction stages, operating on in-memory records.
//!
//! ## Stages
//!
//! Data flows through the stages in this order:
//!
//! 1. [`reducer`] - averages the two boxes of a replicate and labels them liquid or vapor
//! 2. [`aggregator`] - mean and sample standard deviation over the replicates of a state point
//! 3. [`critical`] - extrapolates the critical point from the highest temperatures of a series
//! 4. [`boiling`] - solves the vapor-pressure curve for the normal boiling point
//! 5. [`points`] - averages point estimates across replicates after checking their windows agree
//!
//! ## Supporting Modules
//!
//! - **Configuration** ([`config`]) - fit constants, step window, file names and simulation settings
//! - **Error Handling** ([`error`]) - the errors every stage reports
//! - **Progress Monitoring** ([`progress`]) - callback events consumed by front ends
//!
//! File locations are resolved by [`crate::workflows`]; nothing here reads
//! or writes the project layout.

pub mod aggregator;
pub mod boiling;
pub mod config;
pub mod critical;
pub mod error;
pub mod points;
pub mod progress;
pub mod reducer;
