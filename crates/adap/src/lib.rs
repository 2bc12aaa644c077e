//! Evaluation engine for the ADAP employee-evaluation platform.
//!
//! Companies own evaluation templates and employees; templates are assigned to employees,
//! answered once, and reduced into weighted self-leadership, performance, and
//! organizational-support scores.

pub mod config;
pub mod error;
pub mod evaluation;
pub mod identity;
pub mod telemetry;
