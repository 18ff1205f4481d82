//! # Coexist Core Library
//!
//! Vapor-liquid coexistence analysis for Gibbs-ensemble simulation campaigns:
//! replicate block averages are reduced, aggregated per state point, and fitted
//! to estimate the critical point and normal boiling point of each study.
//!
//! The crate is layered:
//!
//! - **[`core`]**: plain data. Whitespace-aligned tables, block-average files,
//!   typed records and the small statistics toolkit.
//!
//! - **[`engine`]**: the numerics. Replicate reduction, cross-replicate
//!   aggregation, the scaling-law and Clausius-Clapeyron fits, and the
//!   configuration, error and progress types they share.
//!
//! - **[`workflows`]**: the public API over a project directory. It ties
//!   `engine` and `core` to the files of each job and study.

pub mod core;
pub mod engine;
pub mod workflows;
