//! # Document Model
//!
//! The input representation for the layout engine. A document is an ordered
//! sequence of content blocks flowing top to bottom; the block order defines
//! reading order and is preserved exactly in the paginated output.
//!
//! Blocks are immutable once constructed. Table cells own their nested
//! blocks exclusively, and cells are recursive: a cell may hold paragraphs,
//! spacers, rules, or another table.

use crate::style::{Color, StyleSheet};
use serde::{Deserialize, Serialize};

/// A complete document ready for pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Page size and margins shared by every page of the document.
    #[serde(default)]
    pub geometry: PageGeometry,

    /// Named styles referenced by paragraphs. Resolved once, before layout.
    #[serde(default)]
    pub styles: StyleSheet,

    /// The content blocks, in reading order.
    pub blocks: Vec<ContentBlock>,
}

/// Page size and margins. The content area is the page minus its margins;
/// all placed-box coordinates are relative to the content area's top-left
/// corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page size. Defaults to US Letter.
    #[serde(default)]
    pub size: PageSize,

    /// Page margins in points (1/72 inch).
    #[serde(default = "default_margin")]
    pub margin: Edges,
}

fn default_margin() -> Edges {
    Edges::uniform(54.0) // 0.75 inch
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            size: PageSize::Letter,
            margin: default_margin(),
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f64 {
        let (w, _) = self.size.dimensions();
        w - self.margin.horizontal()
    }

    pub fn content_height(&self) -> f64 {
        let (_, h) = self.size.dimensions();
        h - self.margin.vertical()
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    A3,
    A5,
    #[default]
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for margins and padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// A unit of document content. Order within `Document::blocks` is reading
/// order; the flow engine never reorders blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Word-wrapped text in a named style.
    Paragraph { text: String, style: String },

    /// Fixed vertical gap. Consumes no width.
    Spacer { height: f64 },

    /// A horizontal rule spanning the available width.
    Rule {
        thickness: f64,
        #[serde(default)]
        color: Color,
        #[serde(default)]
        space_before: f64,
        #[serde(default)]
        space_after: f64,
    },

    /// A fixed-column-width table. `column_widths` must sum to at most the
    /// width available to the table; columns are never auto-shrunk.
    Table {
        rows: Vec<TableRow>,
        column_widths: Vec<f64>,
        #[serde(default)]
        style: TableStyle,
    },

    /// Forces the current page to end, regardless of remaining space.
    PageBreak,
}

impl ContentBlock {
    /// Create a Paragraph block referencing a named style.
    pub fn paragraph(text: &str, style: &str) -> Self {
        ContentBlock::Paragraph {
            text: text.to_string(),
            style: style.to_string(),
        }
    }

    pub fn spacer(height: f64) -> Self {
        ContentBlock::Spacer { height }
    }

    pub fn rule(thickness: f64, color: Color) -> Self {
        ContentBlock::Rule {
            thickness,
            color,
            space_before: 0.0,
            space_after: 0.0,
        }
    }

    pub fn table(rows: Vec<TableRow>, column_widths: Vec<f64>, style: TableStyle) -> Self {
        ContentBlock::Table {
            rows,
            column_widths,
            style,
        }
    }
}

/// One table row. Cells in a row share the row's height, which is the
/// maximum of the cells' content heights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<Cell>,

    /// Header rows are styled with the table's header background and are
    /// repeated at the top of every continuation page when the table splits.
    #[serde(default)]
    pub header: bool,
}

impl TableRow {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            header: false,
        }
    }

    pub fn header(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            header: true,
        }
    }
}

/// One table cell. Owns its nested blocks exclusively; no block is shared
/// between cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub blocks: Vec<ContentBlock>,

    /// Per-cell vertical alignment override. Falls back to the table style.
    #[serde(default)]
    pub valign: Option<VAlign>,
}

impl Cell {
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self {
            blocks,
            valign: None,
        }
    }

    /// Convenience: a cell holding a single paragraph.
    pub fn paragraph(text: &str, style: &str) -> Self {
        Self::new(vec![ContentBlock::paragraph(text, style)])
    }
}

/// Vertical alignment of cell content within its row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
}

/// Visual treatment shared by all cells of a table. Border lines are
/// decorations keyed to row boundaries, not properties of any single cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStyle {
    /// Padding inside every cell.
    #[serde(default = "default_cell_padding")]
    pub cell_padding: Edges,

    /// Default vertical alignment for cell content.
    #[serde(default)]
    pub valign: VAlign,

    /// Background fill behind every body row.
    #[serde(default)]
    pub background: Option<Color>,

    /// Background fill behind header rows. Falls back to `background`.
    #[serde(default)]
    pub header_background: Option<Color>,

    /// Rule drawn along the bottom boundary of every body row.
    #[serde(default)]
    pub rule_below: Option<RowRule>,

    /// Rule drawn along the bottom boundary of header rows.
    /// Falls back to `rule_below`.
    #[serde(default)]
    pub header_rule_below: Option<RowRule>,
}

fn default_cell_padding() -> Edges {
    // Left/right 6pt, top/bottom 3pt.
    Edges::symmetric(3.0, 6.0)
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            cell_padding: default_cell_padding(),
            valign: VAlign::Top,
            background: None,
            header_background: None,
            rule_below: None,
            header_rule_below: None,
        }
    }
}

/// A row-boundary rule: thickness and color of the line drawn under a row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RowRule {
    pub thickness: f64,
    pub color: Color,
}
