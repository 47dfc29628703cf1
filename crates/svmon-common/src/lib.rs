//! Shared record and sample types for the svmon agent.
//!
//! The collector crate produces [`types::Sample`] values, the sampler
//! assembles them into a [`types::MetricRecord`], and the sink persists
//! the finished record. Unit conversions and the uniform rounding
//! policy live in [`units`].

pub mod types;
pub mod units;
