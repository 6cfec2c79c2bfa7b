//! Raster chart rendering for Folio documents.
//!
//! Turns visualization suggestions into PNG images suitable for embedding in
//! the rendered PDF: bar, horizontal bar, line, pie and donut charts, plus a
//! "No data available" placeholder when a suggestion arrives without data.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod renderer;
mod style;

pub use renderer::{ChartData, ChartRenderer, MAX_RENDERED_CHARTS};
pub use style::{ChartStyle, ChartStyleBuilder, DEFAULT_PALETTE};
