//! Integration tests for the pageflow pagination pipeline.
//!
//! These tests exercise the full path from JSON (or constructed documents)
//! to placed-box pages. They verify:
//! - JSON deserialization works correctly
//! - The flow engine produces the right number of pages
//! - Page breaks happen at the right places
//! - Table header repetition works
//! - Errors surface before any page is emitted

use pageflow::layout::{DocumentLayout, LayoutEngine, PlacedBox, PlacedContent};
use pageflow::model::*;
use pageflow::style::*;
use pageflow::LayoutError;

// ─── Helpers ────────────────────────────────────────────────────

fn body_sheet() -> StyleSheet {
    let mut sheet = StyleSheet::new();
    sheet.insert(
        "body",
        Style {
            font_name: Some("Helvetica".to_string()),
            font_size: Some(12.0),
            ..Style::default()
        },
    );
    sheet
}

fn default_doc(blocks: Vec<ContentBlock>) -> Document {
    Document {
        geometry: PageGeometry::default(),
        styles: body_sheet(),
        blocks,
    }
}

fn make_paragraph(text: &str) -> ContentBlock {
    ContentBlock::paragraph(text, "body")
}

fn paginate(document: &Document) -> DocumentLayout {
    pageflow::paginate(document).expect("document should paginate")
}

fn make_item_table(header_cells: Vec<&str>, rows: Vec<Vec<String>>) -> ContentBlock {
    let mut table_rows = vec![TableRow::header(
        header_cells
            .into_iter()
            .map(|text| Cell::paragraph(text, "body"))
            .collect(),
    )];
    for row in rows {
        table_rows.push(TableRow::new(
            row.iter()
                .map(|text| Cell::paragraph(text, "body"))
                .collect(),
        ));
    }
    let column_count = table_rows[0].cells.len();
    ContentBlock::table(
        table_rows,
        vec![120.0; column_count],
        TableStyle {
            header_background: Some(Color::hex("#1a1a1a")),
            ..TableStyle::default()
        },
    )
}

// ─── Basic Pipeline Tests ───────────────────────────────────────

#[test]
fn test_empty_document() {
    let layout = paginate(&default_doc(vec![]));
    assert!(layout.pages.is_empty(), "empty document should produce no pages");
}

#[test]
fn test_single_paragraph() {
    let layout = paginate(&default_doc(vec![make_paragraph("Hello, World!")]));
    assert_eq!(layout.pages.len(), 1);
    assert_eq!(layout.pages[0].index, 1);
    assert_eq!(layout.pages[0].boxes.len(), 1);
}

#[test]
fn test_explicit_page_break() {
    let layout = paginate(&default_doc(vec![
        make_paragraph("Page 1"),
        ContentBlock::PageBreak,
        make_paragraph("Page 2"),
    ]));
    assert_eq!(
        layout.pages.len(),
        2,
        "should have exactly 2 pages after a page break"
    );
    assert_eq!(layout.pages[1].boxes[0].y, 0.0);
}

#[test]
fn test_multiple_page_breaks() {
    let layout = paginate(&default_doc(vec![
        make_paragraph("Page 1"),
        ContentBlock::PageBreak,
        make_paragraph("Page 2"),
        ContentBlock::PageBreak,
        make_paragraph("Page 3"),
    ]));
    assert_eq!(layout.pages.len(), 3);
}

// ─── Page Overflow Tests ────────────────────────────────────────

#[test]
fn test_content_overflow_creates_new_pages() {
    // Letter content height is 684pt (792 - 2×54). At 12pt with default
    // 1.2 leading each paragraph is 14.4pt, so 100 of them need 3 pages.
    let blocks: Vec<ContentBlock> = (0..100)
        .map(|i| make_paragraph(&format!("Line {}", i)))
        .collect();
    let layout = paginate(&default_doc(blocks));
    assert!(
        layout.pages.len() >= 2,
        "100 paragraphs should overflow, got {} pages",
        layout.pages.len()
    );
}

#[test]
fn test_block_order_spans_pages() {
    let blocks: Vec<ContentBlock> = (0..100)
        .map(|i| make_paragraph(&format!("Line {}", i)))
        .collect();
    let n = blocks.len();
    let layout = paginate(&default_doc(blocks));
    let placed: Vec<usize> = layout
        .pages
        .iter()
        .flat_map(|p| p.boxes.iter().filter_map(|b| b.block))
        .collect();
    assert_eq!(
        placed,
        (0..n).collect::<Vec<_>>(),
        "no block dropped, none duplicated, order preserved"
    );
}

#[test]
fn test_oversized_block_is_warned_not_fatal() {
    let layout = paginate(&default_doc(vec![
        ContentBlock::spacer(100.0),
        ContentBlock::spacer(2000.0),
        make_paragraph("after"),
    ]));
    assert_eq!(layout.pages.len(), 3);
    assert_eq!(layout.warnings.len(), 1);
    match &layout.warnings[0] {
        pageflow::layout::LayoutWarning::BlockTallerThanPage { block, height, .. } => {
            assert_eq!(*block, 1);
            assert_eq!(*height, 2000.0);
        }
    }
}

// ─── Table Tests ────────────────────────────────────────────────

#[test]
fn test_simple_table() {
    let table = make_item_table(
        vec!["Name", "Age"],
        vec![
            vec!["Alice".to_string(), "30".to_string()],
            vec!["Bob".to_string(), "25".to_string()],
        ],
    );
    let layout = paginate(&default_doc(vec![table]));
    assert_eq!(layout.pages.len(), 1);
    // Header + two body rows, all top-level boxes of the table block.
    assert_eq!(layout.pages[0].boxes.len(), 3);
    for row_box in &layout.pages[0].boxes {
        assert_eq!(row_box.block, Some(0));
        assert_eq!(row_box.children.len(), 2);
    }
}

#[test]
fn test_table_header_repeats_across_pages() {
    let rows: Vec<Vec<String>> = (0..80)
        .map(|i| vec![format!("Item {}", i), "Value".to_string()])
        .collect();
    let table = make_item_table(vec!["Name", "Value"], rows);
    let layout = paginate(&default_doc(vec![table]));
    assert!(
        layout.pages.len() >= 2,
        "80-row table should span multiple pages, got {}",
        layout.pages.len()
    );

    let header_bg = Color::hex("#1a1a1a");
    let is_header = |bx: &PlacedBox| {
        matches!(
            bx.content,
            PlacedContent::Rect { background: Some(bg) } if bg == header_bg
        )
    };
    for (i, page) in layout.pages.iter().enumerate() {
        assert!(
            is_header(&page.boxes[0]),
            "page {} should start with the repeated header row",
            i
        );
    }
}

#[test]
fn test_rows_stay_whole_across_splits() {
    let rows: Vec<Vec<String>> = (0..60)
        .map(|i| vec![format!("Row {}", i), "Data".to_string()])
        .collect();
    let table = make_item_table(vec!["Col A", "Col B"], rows);
    let document = default_doc(vec![table]);
    let layout = paginate(&document);
    let content_height = document.geometry.content_height();
    for page in &layout.pages {
        for row_box in &page.boxes {
            assert_eq!(row_box.children.len(), 2, "row lost a cell across a split");
            assert!(row_box.y + row_box.height <= content_height + 1e-9);
        }
    }
}

// ─── JSON Deserialization Tests ─────────────────────────────────

#[test]
fn test_minimal_json() {
    let json = r#"{
        "styles": { "body": { "fontSize": 14 } },
        "blocks": [
            { "type": "Paragraph", "text": "Hello from JSON", "style": "body" }
        ]
    }"#;
    let layout = pageflow::paginate_json(json).expect("should parse minimal JSON");
    assert_eq!(layout.pages.len(), 1);
}

#[test]
fn test_camel_case_deserialization() {
    let json = r#"{
        "geometry": {
            "size": "Letter",
            "margin": { "top": 72, "right": 72, "bottom": 72, "left": 72 }
        },
        "styles": {
            "head": {
                "fontName": "Helvetica-Bold",
                "fontSize": 16,
                "leading": 20,
                "alignment": "Center",
                "spaceBefore": 12,
                "background": { "r": 0.9, "g": 0.9, "b": 0.95, "a": 1.0 }
            }
        },
        "blocks": [
            { "type": "Paragraph", "text": "Test", "style": "head" }
        ]
    }"#;
    let document: Document = serde_json::from_str(json).expect("should deserialize camelCase");
    assert!(matches!(document.geometry.size, PageSize::Letter));
    assert_eq!(document.geometry.margin.top, 72.0);
    let layout = paginate(&document);
    assert_eq!(layout.pages.len(), 1);
}

#[test]
fn test_style_inheritance_json() {
    let json = r#"{
        "styles": {
            "base": { "fontSize": 20, "leading": 24, "color": { "r": 0.5, "g": 0.5, "b": 0.5, "a": 1 } },
            "derived": { "base": "base", "fontSize": 10 }
        },
        "blocks": [
            { "type": "Paragraph", "text": "inherits leading and color", "style": "derived" }
        ]
    }"#;
    let layout = pageflow::paginate_json(json).expect("should handle style inheritance");
    match &layout.pages[0].boxes[0].content {
        PlacedContent::Text {
            font_size, leading, ..
        } => {
            assert_eq!(*font_size, 10.0);
            assert_eq!(*leading, 24.0);
        }
        other => panic!("expected Text, got {:?}", other),
    }
}

#[test]
fn test_table_json() {
    let json = r#"{
        "styles": { "body": {} },
        "blocks": [
            {
                "type": "Table",
                "column_widths": [120, 120],
                "style": { "headerBackground": { "r": 0.1, "g": 0.1, "b": 0.1, "a": 1 } },
                "rows": [
                    {
                        "header": true,
                        "cells": [
                            { "blocks": [{ "type": "Paragraph", "text": "Header A", "style": "body" }] },
                            { "blocks": [{ "type": "Paragraph", "text": "Header B", "style": "body" }] }
                        ]
                    },
                    {
                        "cells": [
                            { "blocks": [{ "type": "Paragraph", "text": "Cell", "style": "body" }] },
                            { "blocks": [{ "type": "Spacer", "height": 20 }] }
                        ]
                    }
                ]
            }
        ]
    }"#;
    let layout = pageflow::paginate_json(json).expect("should parse table JSON");
    assert_eq!(layout.pages.len(), 1);
    assert_eq!(layout.pages[0].boxes.len(), 2);
}

#[test]
fn test_example_document_paginates() {
    // The CLI's --example document must stay valid against the schema.
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_pageflow"))
        .arg("--example")
        .output()
        .expect("example binary should run");
    let json = String::from_utf8(output.stdout).expect("example JSON should be UTF-8");
    let layout = pageflow::paginate_json(&json).expect("example document should paginate");
    // The example contains an explicit page break.
    assert!(layout.pages.len() >= 2);
    assert!(layout.warnings.is_empty());
}

// ─── Error Handling Tests ───────────────────────────────────────

#[test]
fn test_invalid_json_returns_parse_error() {
    let result = pageflow::paginate_json("not valid json {{{");
    let err = result.expect_err("invalid JSON should return Err");
    let msg = err.to_string();
    assert!(
        msg.contains("failed to parse document"),
        "error should describe parse failure: {}",
        msg
    );
    assert!(msg.contains("Hint:"), "error should include hint: {}", msg);
}

#[test]
fn test_wrong_schema_returns_parse_error() {
    let result = pageflow::paginate_json(r#"{"wrong": "schema"}"#);
    assert!(matches!(result, Err(LayoutError::Parse { .. })));
}

#[test]
fn test_unknown_style_is_fatal_and_atomic() {
    let document = Document {
        geometry: PageGeometry::default(),
        styles: StyleSheet::new(),
        blocks: vec![
            ContentBlock::spacer(600.0),
            ContentBlock::paragraph("text", "nope"),
        ],
    };
    let result = pageflow::paginate(&document);
    assert!(
        matches!(result, Err(LayoutError::UnknownStyle { ref name }) if name == "nope"),
        "a run fails whole; no partial page list is observable"
    );
}

// ─── Decorator Tests ────────────────────────────────────────────

#[test]
fn test_decorator_sees_every_page_once_in_order() {
    let blocks: Vec<ContentBlock> = (0..3)
        .flat_map(|_| vec![make_paragraph("content"), ContentBlock::PageBreak])
        .take(5) // paragraph, break, paragraph, break, paragraph
        .collect();
    let document = default_doc(blocks);
    let engine = LayoutEngine::new();
    let mut footers: Vec<String> = Vec::new();
    let layout = engine
        .paginate_with(&document, &pageflow::font::BuiltinFonts, |page, geometry| {
            footers.push(format!(
                "Page {} | {}x{}",
                page.index,
                geometry.content_width(),
                geometry.content_height()
            ));
        })
        .expect("should paginate");
    assert_eq!(layout.pages.len(), 3);
    assert_eq!(
        footers,
        vec![
            "Page 1 | 504x684".to_string(),
            "Page 2 | 504x684".to_string(),
            "Page 3 | 504x684".to_string(),
        ]
    );
}

// ─── Determinism ────────────────────────────────────────────────

#[test]
fn test_reruns_are_byte_identical() {
    let rows: Vec<Vec<String>> = (0..40)
        .map(|i| vec![format!("Item {}", i), "Value".to_string()])
        .collect();
    let document = default_doc(vec![
        make_paragraph("A mixed document with a table that splits."),
        ContentBlock::rule(1.0, Color::hex("#2a2a2a")),
        make_item_table(vec!["Name", "Value"], rows),
        ContentBlock::PageBreak,
        make_paragraph("Appendix"),
    ]);
    let a = serde_json::to_string(&paginate(&document)).unwrap();
    let b = serde_json::to_string(&paginate(&document)).unwrap();
    assert_eq!(a, b, "identical inputs must yield byte-identical layouts");
}
