//! # Core Models Module
//!
//! Data structures describing what the analysis pipeline reads and writes.
//!
//! ## Key Components
//!
//! - [`observable`] - The thermodynamic quantities averaged per simulation box
//! - [`properties`] - A value per observable, generic over plain means and statistics
//! - [`records`] - Per-replicate box records and cross-replicate aggregates
//! - [`estimates`] - Critical and boiling point estimates and their summaries
//! - [`statepoint`] - Job parameters and the group keys derived from them
//!
//! Every record that is persisted implements
//! [`TabularRecord`](crate::core::io::traits::TabularRecord), so its column
//! layout is defined next to the type itself.

pub mod estimates;
pub mod observable;
pub mod properties;
pub mod records;
pub mod statepoint;
