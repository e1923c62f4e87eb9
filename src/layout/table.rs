//! # Table Layout
//!
//! Fixed-column tables. Every cell lays out its nested blocks at its
//! column's width; the row height is the tallest cell's content plus the
//! shared cell padding, and every cell in the row is stretched to that
//! height. Border lines are decorations keyed to row boundaries, owned by
//! the row, never by a cell.
//!
//! Tables split across pages at row boundaries only — never inside a row —
//! and header rows repeat at the top of every continuation page. A row
//! taller than a full page content area is a fatal error, caught by the
//! validation pass before any page is emitted.

use std::collections::HashMap;

use crate::error::LayoutError;
use crate::font::FontMetrics;
use crate::model::{Cell, ContentBlock, TableRow, TableStyle, VAlign};
use crate::style::ResolvedStyle;

use super::{
    lookup_style, offset_box_x, offset_box_y, FlowCtx, LayoutEngine, PlacedBox, PlacedContent,
};

/// Slack allowed when comparing summed column widths against the available
/// width, to absorb float accumulation in caller-computed widths.
const WIDTH_TOLERANCE: f64 = 0.001;

/// Check a table's configuration and, for top-level tables, that every row
/// fits a page. `page_capacity` is `None` for tables nested inside cells —
/// those never split, so their rows are not page-bounded.
#[allow(clippy::too_many_arguments)]
pub(crate) fn validate_table(
    engine: &LayoutEngine,
    block: usize,
    rows: &[TableRow],
    column_widths: &[f64],
    tstyle: &TableStyle,
    available_width: f64,
    page_capacity: Option<f64>,
    styles: &HashMap<String, ResolvedStyle>,
    metrics: &dyn FontMetrics,
) -> Result<(), LayoutError> {
    let widths_sum: f64 = column_widths.iter().sum();
    if widths_sum > available_width + WIDTH_TOLERANCE {
        return Err(LayoutError::ColumnsTooWide {
            block,
            widths_sum,
            available: available_width,
        });
    }

    for row in rows {
        for (cell, col_width) in row.cells.iter().zip(column_widths) {
            let inner = (col_width - tstyle.cell_padding.horizontal()).max(0.0);
            for nested in &cell.blocks {
                engine.validate_block(nested, block, inner, None, styles, metrics)?;
            }
        }
    }

    if let Some(capacity) = page_capacity {
        // Header rows are repeated after every split, so body rows only
        // get what the headers leave over.
        let mut header_total = 0.0;
        for (row_index, row) in rows.iter().enumerate() {
            if !row.header {
                continue;
            }
            let height = layout_row(engine, metrics, styles, row, column_widths, tstyle, None)?
                .height;
            if height > capacity {
                return Err(LayoutError::RowTooTall {
                    block,
                    row: row_index,
                    height,
                    available: capacity,
                });
            }
            header_total += height;
        }
        // Header rows repeat together, so the whole header block must fit
        // a page on its own.
        if header_total > capacity {
            let last_header = rows.iter().rposition(|r| r.header).unwrap_or(0);
            return Err(LayoutError::RowTooTall {
                block,
                row: last_header,
                height: header_total,
                available: capacity,
            });
        }
        let body_capacity = capacity - header_total;
        for (row_index, row) in rows.iter().enumerate() {
            if row.header {
                continue;
            }
            let height = layout_row(engine, metrics, styles, row, column_widths, tstyle, None)?
                .height;
            if height > body_capacity {
                return Err(LayoutError::RowTooTall {
                    block,
                    row: row_index,
                    height,
                    available: body_capacity,
                });
            }
        }
    }

    Ok(())
}

/// Flow a top-level table through the page cursor, splitting at row
/// boundaries and repeating header rows on every continuation page.
#[allow(clippy::too_many_arguments)]
pub(crate) fn flow_table(
    engine: &LayoutEngine,
    ctx: &mut FlowCtx,
    metrics: &dyn FontMetrics,
    styles: &HashMap<String, ResolvedStyle>,
    rows: &[TableRow],
    column_widths: &[f64],
    tstyle: &TableStyle,
    index: usize,
) -> Result<(), LayoutError> {
    let header_rows: Vec<&TableRow> = rows.iter().filter(|r| r.header).collect();

    // If the header block plus the first body row cannot fit in what is
    // left of the current page, open the table on a fresh page instead of
    // stranding a header at the bottom.
    if ctx.cursor.has_content() {
        let mut opening = 0.0;
        for row in &header_rows {
            opening +=
                layout_row(engine, metrics, styles, row, column_widths, tstyle, None)?.height;
        }
        if let Some(first_body) = rows.iter().find(|r| !r.header) {
            opening += layout_row(engine, metrics, styles, first_body, column_widths, tstyle, None)?
                .height;
        }
        if opening > ctx.cursor.remaining() {
            ctx.close_page();
        }
    }

    place_header_rows(
        engine,
        ctx,
        metrics,
        styles,
        &header_rows,
        column_widths,
        tstyle,
        index,
    )?;

    for (row_index, row) in rows.iter().enumerate() {
        if row.header {
            continue;
        }
        let mut bx = layout_row(engine, metrics, styles, row, column_widths, tstyle, Some(index))?;
        if bx.height > ctx.cursor.remaining() {
            log::debug!(
                "table at block {index} splits before row {row_index}; header rows repeat"
            );
            ctx.close_page();
            place_header_rows(
                engine,
                ctx,
                metrics,
                styles,
                &header_rows,
                column_widths,
                tstyle,
                index,
            )?;
        }
        offset_box_y(&mut bx, ctx.cursor.y);
        ctx.cursor.y += bx.height;
        ctx.cursor.boxes.push(bx);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn place_header_rows(
    engine: &LayoutEngine,
    ctx: &mut FlowCtx,
    metrics: &dyn FontMetrics,
    styles: &HashMap<String, ResolvedStyle>,
    header_rows: &[&TableRow],
    column_widths: &[f64],
    tstyle: &TableStyle,
    index: usize,
) -> Result<(), LayoutError> {
    for row in header_rows {
        let mut bx = layout_row(engine, metrics, styles, row, column_widths, tstyle, Some(index))?;
        offset_box_y(&mut bx, ctx.cursor.y);
        ctx.cursor.y += bx.height;
        ctx.cursor.boxes.push(bx);
    }
    Ok(())
}

/// Build one row box at the origin: cell containers sharing the row
/// height, their nested content, and the row-boundary rule decoration.
pub(crate) fn layout_row(
    engine: &LayoutEngine,
    metrics: &dyn FontMetrics,
    styles: &HashMap<String, ResolvedStyle>,
    row: &TableRow,
    column_widths: &[f64],
    tstyle: &TableStyle,
    block: Option<usize>,
) -> Result<PlacedBox, LayoutError> {
    let padding = tstyle.cell_padding;
    let total_width: f64 = column_widths.iter().sum();

    // First pass: lay out every cell's content at its column width. The
    // row height is the tallest content plus the shared padding.
    let mut laid_cells: Vec<(&Cell, f64, Vec<PlacedBox>, f64)> =
        Vec::with_capacity(row.cells.len());
    let mut row_inner = 0.0f64;
    for (cell, col_width) in row.cells.iter().zip(column_widths) {
        let inner_width = (col_width - padding.horizontal()).max(0.0);
        let (content, content_height) =
            layout_cell(engine, metrics, styles, &cell.blocks, inner_width)?;
        row_inner = row_inner.max(content_height);
        laid_cells.push((cell, *col_width, content, content_height));
    }
    let height = row_inner + padding.vertical();

    let mut children = Vec::with_capacity(laid_cells.len() + 1);
    let mut cell_x = 0.0;
    for (cell, col_width, mut content, content_height) in laid_cells {
        let valign = cell.valign.unwrap_or(tstyle.valign);
        let dy = match valign {
            VAlign::Top => 0.0,
            VAlign::Middle => ((row_inner - content_height) / 2.0).max(0.0),
        };
        for bx in &mut content {
            offset_box_y(bx, padding.top + dy);
            offset_box_x(bx, cell_x + padding.left);
        }
        children.push(PlacedBox {
            x: cell_x,
            y: 0.0,
            width: col_width,
            height,
            block: None,
            content: PlacedContent::Rect { background: None },
            children: content,
        });
        cell_x += col_width;
    }

    let rule = if row.header {
        tstyle.header_rule_below.or(tstyle.rule_below)
    } else {
        tstyle.rule_below
    };
    if let Some(rule) = rule {
        children.push(PlacedBox {
            x: 0.0,
            y: height - rule.thickness,
            width: total_width,
            height: rule.thickness,
            block: None,
            content: PlacedContent::Rule {
                thickness: rule.thickness,
                color: rule.color,
            },
            children: Vec::new(),
        });
    }

    let background = if row.header {
        tstyle.header_background.or(tstyle.background)
    } else {
        tstyle.background
    };

    Ok(PlacedBox {
        x: 0.0,
        y: 0.0,
        width: total_width,
        height,
        block,
        content: PlacedContent::Rect { background },
        children,
    })
}

/// Lay out a cell's nested blocks, stacked top to bottom at the cell's
/// inner width, starting at the origin. Returns the boxes and the total
/// content height. Nested tables never split; their rows stack in place.
pub(crate) fn layout_cell(
    engine: &LayoutEngine,
    metrics: &dyn FontMetrics,
    styles: &HashMap<String, ResolvedStyle>,
    blocks: &[ContentBlock],
    width: f64,
) -> Result<(Vec<PlacedBox>, f64), LayoutError> {
    let mut boxes = Vec::new();
    let mut y = 0.0;
    let mut first = true;

    for block in blocks {
        match block {
            ContentBlock::PageBreak => {
                // Cells are not page-scoped; a nested page break is inert.
                log::debug!("ignoring page break inside a table cell");
            }

            ContentBlock::Paragraph { text, style } => {
                let resolved = lookup_style(styles, style)?;
                let mut bx = engine.layout_paragraph(metrics, text, resolved, width, None);
                let gap = if first { 0.0 } else { resolved.space_before };
                offset_box_y(&mut bx, y + gap);
                y += gap + bx.height + resolved.space_after;
                boxes.push(bx);
                first = false;
            }

            ContentBlock::Spacer { height } => {
                boxes.push(PlacedBox {
                    x: 0.0,
                    y,
                    width,
                    height: *height,
                    block: None,
                    content: PlacedContent::Spacer,
                    children: Vec::new(),
                });
                y += height;
                first = false;
            }

            ContentBlock::Rule {
                thickness,
                color,
                space_before,
                space_after,
            } => {
                let gap = if first { 0.0 } else { *space_before };
                boxes.push(PlacedBox {
                    x: 0.0,
                    y: y + gap,
                    width,
                    height: *thickness,
                    block: None,
                    content: PlacedContent::Rule {
                        thickness: *thickness,
                        color: *color,
                    },
                    children: Vec::new(),
                });
                y += gap + thickness + space_after;
                first = false;
            }

            ContentBlock::Table {
                rows,
                column_widths,
                style,
            } => {
                for row in rows {
                    let mut bx =
                        layout_row(engine, metrics, styles, row, column_widths, style, None)?;
                    offset_box_y(&mut bx, y);
                    y += bx.height;
                    boxes.push(bx);
                }
                first = false;
            }
        }
    }

    Ok((boxes, y))
}
