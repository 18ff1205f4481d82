//! # Workflows Module
//!
//! Project-level entry points. Each workflow resolves jobs and studies from a
//! project directory, checks the stage predicates in [`status`], and drives
//! the `engine` over the files it finds.
//!
//! - [`init`] creates job directories from a study definition.
//! - [`simulate`] resolves simulation engine launches for a job.
//! - [`analyze`] runs the reduce, aggregate, point and summary stages.
//! - [`report`] collects study summaries into one CSV file.

pub mod analyze;
pub mod init;
pub mod project;
pub mod report;
pub mod simulate;
pub mod status;
