//! CLI library components for the row matcher.

pub mod logging;
pub mod pipeline;
