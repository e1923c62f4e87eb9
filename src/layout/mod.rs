//! # Flow/Pagination Engine
//!
//! This is the heart of pageflow and the reason it exists.
//!
//! The engine never lays content onto an infinite canvas and slices it
//! afterwards. The page is the fundamental unit of layout: every block is
//! measured against the space remaining on the current page before it is
//! placed. The algorithm is:
//!
//! 1. Open a page with known content dimensions and remaining space
//! 2. For each block, ask: "does this fit?"
//! 3. If it fits: place it at the cursor, reduce remaining space
//! 4. If it is a table that doesn't fit: place the rows that fit, close the
//!    page, and continue on the next page with header rows repeated
//! 5. If it is an unsplittable block taller than a whole page: give it a
//!    dedicated page and record an overflow warning (never an infinite loop)
//! 6. An explicit PageBreak closes the page regardless of remaining space
//!
//! Output pages preserve the input block order exactly. All placed
//! coordinates are relative to the page content area (top-left origin), so
//! every box satisfies `0 <= y` and `y + height <= content_height` except
//! for recorded overflow cases.
//!
//! The engine is a pure function over its inputs: one pagination pass per
//! document, no shared state between runs, deterministic output.

pub mod table;

use std::collections::HashMap;

use serde::Serialize;

use crate::error::LayoutError;
use crate::font::FontMetrics;
use crate::model::{ContentBlock, Document, PageGeometry};
use crate::style::{Align, BorderSpec, Color, ResolvedStyle};
use crate::text::TextMeasurer;

/// One laid-out page: its 1-based index and the boxes placed on it, in
/// flow order (strictly increasing top coordinate at the top level).
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub index: usize,
    pub boxes: Vec<PlacedBox>,
}

/// The result of a pagination run: the ordered pages plus any recorded
/// (non-fatal) warnings.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentLayout {
    pub pages: Vec<Page>,
    pub warnings: Vec<LayoutWarning>,
}

/// A positioned box on a page. Produced once by the engine, never mutated
/// afterwards. Coordinates are content-area-relative.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Index of the originating top-level content block. `None` for nested
    /// boxes (cell contents, row-boundary decorations) whose origin is
    /// structural.
    pub block: Option<usize>,
    pub content: PlacedContent,
    /// Nested boxes (table cells inside rows, blocks inside cells).
    pub children: Vec<PlacedBox>,
}

/// What to draw for a placed box. The external renderer turns these into
/// drawing primitives; the engine only decides geometry.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum PlacedContent {
    /// Word-wrapped text. Line positions are content-area-absolute.
    Text {
        lines: Vec<PlacedLine>,
        font_name: String,
        font_size: f64,
        leading: f64,
        color: Color,
        background: Option<Color>,
        border: Option<BorderSpec>,
    },
    /// A filled (or invisible, when `background` is None) container.
    Rect { background: Option<Color> },
    /// A horizontal rule.
    Rule { thickness: f64, color: Color },
    /// Vertical whitespace.
    Spacer,
}

/// One line of placed text. `y` is the top of the line slot; the renderer
/// derives the baseline from the font size.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedLine {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub width: f64,
}

/// A recorded, non-fatal layout condition. The run proceeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LayoutWarning {
    /// An unsplittable block was taller than a full page content area and
    /// was placed alone on a dedicated page.
    BlockTallerThanPage {
        block: usize,
        height: f64,
        content_height: f64,
    },
}

/// Shift a placed box and all its nested content down by `dy` points.
fn offset_box_y(bx: &mut PlacedBox, dy: f64) {
    bx.y += dy;
    if let PlacedContent::Text { ref mut lines, .. } = bx.content {
        for line in lines.iter_mut() {
            line.y += dy;
        }
    }
    for child in &mut bx.children {
        offset_box_y(child, dy);
    }
}

/// Shift a placed box and all its nested content right by `dx` points.
fn offset_box_x(bx: &mut PlacedBox, dx: f64) {
    bx.x += dx;
    if let PlacedContent::Text { ref mut lines, .. } = bx.content {
        for line in lines.iter_mut() {
            line.x += dx;
        }
    }
    for child in &mut bx.children {
        offset_box_x(child, dx);
    }
}

/// Tracks where we are on the current page during layout.
#[derive(Debug)]
pub(crate) struct PageCursor {
    pub(crate) content_width: f64,
    pub(crate) content_height: f64,
    /// Vertical cursor from the top of the content area.
    pub(crate) y: f64,
    pub(crate) boxes: Vec<PlacedBox>,
    /// 1-based number of the page being filled.
    pub(crate) index: usize,
}

impl PageCursor {
    fn new(geometry: &PageGeometry) -> Self {
        Self {
            content_width: geometry.content_width(),
            content_height: geometry.content_height(),
            y: 0.0,
            boxes: Vec::new(),
            index: 1,
        }
    }

    pub(crate) fn remaining(&self) -> f64 {
        (self.content_height - self.y).max(0.0)
    }

    pub(crate) fn has_content(&self) -> bool {
        !self.boxes.is_empty() || self.y > 0.0
    }

    /// Emit the current page and reset the cursor for the next one.
    fn finalize(&mut self) -> Page {
        let page = Page {
            index: self.index,
            boxes: std::mem::take(&mut self.boxes),
        };
        self.y = 0.0;
        self.index += 1;
        page
    }
}

/// Mutable state threaded through one flow pass: the cursor, the pages
/// emitted so far, recorded warnings, and the page decorator hook.
pub(crate) struct FlowCtx<'a> {
    pub(crate) geometry: &'a PageGeometry,
    pub(crate) cursor: PageCursor,
    pub(crate) pages: Vec<Page>,
    pub(crate) warnings: Vec<LayoutWarning>,
    pub(crate) on_page: &'a mut dyn FnMut(&Page, &PageGeometry),
}

impl FlowCtx<'_> {
    /// Close the page being filled: invoke the decorator exactly once with
    /// the finished page, then append it to the output.
    pub(crate) fn close_page(&mut self) {
        let page = self.cursor.finalize();
        log::debug!("page {} closed with {} boxes", page.index, page.boxes.len());
        (self.on_page)(&page, self.geometry);
        self.pages.push(page);
    }
}

pub(crate) fn lookup_style<'a>(
    styles: &'a HashMap<String, ResolvedStyle>,
    name: &str,
) -> Result<&'a ResolvedStyle, LayoutError> {
    styles.get(name).ok_or_else(|| LayoutError::UnknownStyle {
        name: name.to_string(),
    })
}

/// The main layout engine.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    measurer: TextMeasurer,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            measurer: TextMeasurer::new(),
        }
    }

    /// Lay out a document into pages.
    pub fn paginate(
        &self,
        document: &Document,
        metrics: &dyn FontMetrics,
    ) -> Result<DocumentLayout, LayoutError> {
        self.paginate_with(document, metrics, |_, _| {})
    }

    /// Lay out a document into pages, invoking `on_page` exactly once per
    /// finalized page, in page order. The decorator observes each page
    /// after its content is fully placed; it cannot alter placed content.
    pub fn paginate_with<F>(
        &self,
        document: &Document,
        metrics: &dyn FontMetrics,
        mut on_page: F,
    ) -> Result<DocumentLayout, LayoutError>
    where
        F: FnMut(&Page, &PageGeometry),
    {
        let styles = document.styles.resolve_all()?;

        // Every fatal condition — unknown styles, over-wide columns,
        // unsplittable rows — is caught here, before any page exists.
        // The flow pass below cannot fail.
        self.validate(document, &styles, metrics)?;

        let mut ctx = FlowCtx {
            geometry: &document.geometry,
            cursor: PageCursor::new(&document.geometry),
            pages: Vec::new(),
            warnings: Vec::new(),
            on_page: &mut on_page,
        };

        for (index, block) in document.blocks.iter().enumerate() {
            match block {
                ContentBlock::PageBreak => ctx.close_page(),

                ContentBlock::Table {
                    rows,
                    column_widths,
                    style,
                } => {
                    table::flow_table(
                        self,
                        &mut ctx,
                        metrics,
                        &styles,
                        rows,
                        column_widths,
                        style,
                        index,
                    )?;
                }

                ContentBlock::Paragraph { text, style } => {
                    let resolved = lookup_style(&styles, style)?;
                    let width = ctx.cursor.content_width;
                    let bx = self.layout_paragraph(metrics, text, resolved, width, Some(index));
                    self.place_block(
                        &mut ctx,
                        bx,
                        resolved.space_before,
                        resolved.space_after,
                        index,
                    );
                }

                ContentBlock::Spacer { height } => {
                    let bx = PlacedBox {
                        x: 0.0,
                        y: 0.0,
                        width: ctx.cursor.content_width,
                        height: *height,
                        block: Some(index),
                        content: PlacedContent::Spacer,
                        children: Vec::new(),
                    };
                    self.place_block(&mut ctx, bx, 0.0, 0.0, index);
                }

                ContentBlock::Rule {
                    thickness,
                    color,
                    space_before,
                    space_after,
                } => {
                    let bx = PlacedBox {
                        x: 0.0,
                        y: 0.0,
                        width: ctx.cursor.content_width,
                        height: *thickness,
                        block: Some(index),
                        content: PlacedContent::Rule {
                            thickness: *thickness,
                            color: *color,
                        },
                        children: Vec::new(),
                    };
                    self.place_block(&mut ctx, bx, *space_before, *space_after, index);
                }
            }
        }

        // The final, possibly partial page is closed unconditionally.
        if ctx.cursor.has_content() {
            ctx.close_page();
        }

        Ok(DocumentLayout {
            pages: ctx.pages,
            warnings: ctx.warnings,
        })
    }

    /// Place one unsplittable block (paragraph, spacer, rule), already
    /// built at the origin. Handles the fit / next-page / dedicated-page
    /// transitions.
    fn place_block(
        &self,
        ctx: &mut FlowCtx,
        mut bx: PlacedBox,
        space_before: f64,
        space_after: f64,
        index: usize,
    ) {
        let content_height = ctx.cursor.content_height;
        // The gap before a block is suppressed at the top of a page.
        let gap = if ctx.cursor.y > 0.0 { space_before } else { 0.0 };

        if gap + bx.height <= ctx.cursor.remaining() {
            offset_box_y(&mut bx, ctx.cursor.y + gap);
            ctx.cursor.y += gap + bx.height + space_after;
            ctx.cursor.boxes.push(bx);
        } else if bx.height > content_height {
            // Taller than a whole page: dedicated page, recorded warning,
            // and following content starts on the page after.
            if ctx.cursor.has_content() {
                ctx.close_page();
            }
            log::warn!(
                "block {index} is {:.1}pt tall but a page holds {content_height:.1}pt; \
                 placing it on a dedicated page",
                bx.height,
            );
            ctx.warnings.push(LayoutWarning::BlockTallerThanPage {
                block: index,
                height: bx.height,
                content_height,
            });
            ctx.cursor.y = bx.height;
            ctx.cursor.boxes.push(bx);
            ctx.close_page();
        } else {
            ctx.close_page();
            // Cursor is at the top of the fresh page; the box is already
            // at the origin and the before-gap is suppressed.
            ctx.cursor.y = bx.height + space_after;
            ctx.cursor.boxes.push(bx);
        }
    }

    /// Build a paragraph box at the origin: wrap the text at the inner
    /// width and position each line according to the style's alignment.
    pub(crate) fn layout_paragraph(
        &self,
        metrics: &dyn FontMetrics,
        text: &str,
        style: &ResolvedStyle,
        width: f64,
        block: Option<usize>,
    ) -> PlacedBox {
        let inner_width = (width - style.padding.horizontal()).max(0.0);
        let lines = self.measurer.break_into_lines(
            metrics,
            text,
            inner_width,
            &style.font_name,
            style.font_size,
        );
        let height = lines.len() as f64 * style.leading + style.padding.vertical();

        let placed_lines = lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                let x = match style.alignment {
                    Align::Left => style.padding.left,
                    Align::Center => style.padding.left + (inner_width - line.width) / 2.0,
                    Align::Right => style.padding.left + inner_width - line.width,
                };
                PlacedLine {
                    x,
                    y: style.padding.top + i as f64 * style.leading,
                    text: line.text,
                    width: line.width,
                }
            })
            .collect();

        PlacedBox {
            x: 0.0,
            y: 0.0,
            width,
            height,
            block,
            content: PlacedContent::Text {
                lines: placed_lines,
                font_name: style.font_name.clone(),
                font_size: style.font_size,
                leading: style.leading,
                color: style.color,
                background: style.background,
                border: style.border,
            },
            children: Vec::new(),
        }
    }

    /// Upfront validation pass. Walks every block (recursing through table
    /// cells) so that configuration errors and unsplittable rows surface
    /// before any page is emitted.
    fn validate(
        &self,
        document: &Document,
        styles: &HashMap<String, ResolvedStyle>,
        metrics: &dyn FontMetrics,
    ) -> Result<(), LayoutError> {
        let content_width = document.geometry.content_width();
        let content_height = document.geometry.content_height();
        for (index, block) in document.blocks.iter().enumerate() {
            self.validate_block(
                block,
                index,
                content_width,
                Some(content_height),
                styles,
                metrics,
            )?;
        }
        Ok(())
    }

    /// Validate one block at a given available width. `page_capacity` is
    /// the full page content height for top-level blocks, or `None` inside
    /// a table cell (nested tables never split, so row heights are not
    /// page-bounded there).
    pub(crate) fn validate_block(
        &self,
        block: &ContentBlock,
        index: usize,
        available_width: f64,
        page_capacity: Option<f64>,
        styles: &HashMap<String, ResolvedStyle>,
        metrics: &dyn FontMetrics,
    ) -> Result<(), LayoutError> {
        match block {
            ContentBlock::Paragraph { style, .. } => {
                lookup_style(styles, style)?;
                Ok(())
            }
            ContentBlock::Table {
                rows,
                column_widths,
                style,
            } => table::validate_table(
                self,
                index,
                rows,
                column_widths,
                style,
                available_width,
                page_capacity,
                styles,
                metrics,
            ),
            _ => Ok(()),
        }
    }
}
