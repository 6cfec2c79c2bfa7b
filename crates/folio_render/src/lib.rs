//! Branded PDF composition for Folio documents.
//!
//! The render stage turns a [`folio_core::DocumentContent`] into paginated
//! PDF bytes. A named template is attempted first and the built-in layout is
//! used otherwise, so rendering never aborts over a missing template asset.
//! All styling derives from caller branding merged over fixed defaults.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod pdf;
mod stylesheet;
mod template;
mod theme;

pub use pdf::PdfComposer;
pub use stylesheet::Stylesheet;
pub use template::{
    Callout, ChartImage, DocumentTemplate, RenderContext, StandardTemplate, TemplateRegistry,
};
pub use theme::{Color, Theme};
