//! Domain logic for uibench.
//!
//! This crate is intentionally I/O-free: it aggregates reports, does the math and
//! lays out the comparison table. Rendering and transport live elsewhere.

mod color;
mod results;
mod stats;
mod table;

pub use color::{Lch, Rgb, lch_to_rgb, slowness_color, slowness_hue};
pub use results::{ChangeEvent, ResultSet};
pub use stats::{round_ms, summarize};
pub use table::{build_table, linear_scale};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("no samples to summarize")]
    EmptySampleSet,
}
