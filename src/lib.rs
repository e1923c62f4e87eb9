//! # Pageflow
//!
//! A flow-based document layout and pagination engine.
//!
//! Most document generators lay content onto an infinitely tall canvas and
//! slice it into pages afterwards. That is where tables split mid-row,
//! headers go missing, and page footers drift. Pageflow does the opposite:
//! **the page is the fundamental unit of layout.** Every block is measured
//! against the space remaining on the current page before it is placed;
//! content flows *into* pages.
//!
//! The engine stops at geometry. It consumes precomputed font metrics and
//! emits an abstract placed-box tree per page; turning boxes into ink
//! (PDF, SVG, canvas) is the renderer's job, not this crate's.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    — Content blocks: paragraphs, spacers, rules, tables
//!       ↓
//!   [style]    — Named styles, base-chain resolution
//!       ↓
//!   [text]     — Line breaking against font metrics
//!       ↓
//!   [layout]   — Page-aware flow engine
//!       ↓
//!   Placed-box pages (handed to an external renderer)
//! ```

pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod style;
pub mod text;

pub use error::LayoutError;

use font::BuiltinFonts;
use layout::{DocumentLayout, LayoutEngine};
use model::Document;

/// Paginate a document into placed-box pages.
///
/// This is the primary entry point. Uses the built-in AFM font metrics;
/// construct a [`layout::LayoutEngine`] directly to supply your own
/// [`font::FontMetrics`] or a page decorator.
pub fn paginate(document: &Document) -> Result<DocumentLayout, LayoutError> {
    let engine = LayoutEngine::new();
    engine.paginate(document, &BuiltinFonts)
}

/// Paginate a document described as JSON.
pub fn paginate_json(json: &str) -> Result<DocumentLayout, LayoutError> {
    let document: Document = serde_json::from_str(json)?;
    paginate(&document)
}
