//! Reading and writing the text tables exchanged between analysis stages.
//!
//! Simulation output arrives as whitespace-delimited block-average tables
//! ([`blk`]); every derived record is stored as a fixed-width table through
//! the [`traits::TabularRecord`] interface, and the final cross-study
//! summary is exported as CSV ([`report`]).

pub mod blk;
pub mod report;
pub mod table;
pub mod traits;
