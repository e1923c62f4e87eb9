//! Structured error types for the pageflow layout engine.
//!
//! Configuration problems (unknown styles, over-wide columns) and the one
//! fatal layout condition (a table row taller than a page) are all detected
//! by the validation pass before any page exists, so a pagination run either
//! returns a complete page list or fails with exactly one of these.

use thiserror::Error;

/// The unified error type returned by all public pageflow API functions.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A block or base reference names a style that is not in the sheet.
    #[error("unknown style '{name}'")]
    UnknownStyle { name: String },

    /// A style's base chain loops back on itself.
    #[error("style '{name}' is part of a base-style cycle")]
    StyleCycle { name: String },

    /// A table's fixed column widths exceed the width available to it.
    /// Columns are never auto-shrunk.
    #[error(
        "block {block}: column widths sum to {widths_sum:.1}pt but only \
         {available:.1}pt is available"
    )]
    ColumnsTooWide {
        block: usize,
        widths_sum: f64,
        available: f64,
    },

    /// A table row is taller than a full page content area. Rows are the
    /// smallest unit of table splitting, so this cannot be laid out.
    #[error(
        "block {block}: table row {row} is {height:.1}pt tall but a page \
         holds only {available:.1}pt and rows cannot be split"
    )]
    RowTooTall {
        block: usize,
        row: usize,
        height: f64,
        available: f64,
    },

    /// JSON input failed to parse as a pageflow document.
    #[error("failed to parse document: {source}{hint}")]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "\n  Hint: check for trailing commas, missing quotes, or unescaped characters."
            }
            serde_json::error::Category::Data => {
                "\n  Hint: the JSON is valid but doesn't match the document schema. Check field names and types."
            }
            serde_json::error::Category::Eof => {
                "\n  Hint: unexpected end of input — is the JSON truncated?"
            }
            serde_json::error::Category::Io => "",
        };
        LayoutError::Parse {
            source: e,
            hint: hint.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_hint() {
        let e: LayoutError = serde_json::from_str::<serde_json::Value>("{{{")
            .unwrap_err()
            .into();
        let msg = e.to_string();
        assert!(msg.contains("failed to parse document"), "{msg}");
        assert!(msg.contains("Hint:"), "{msg}");
    }

    #[test]
    fn column_error_mentions_widths() {
        let e = LayoutError::ColumnsTooWide {
            block: 3,
            widths_sum: 600.0,
            available: 500.0,
        };
        let msg = e.to_string();
        assert!(msg.contains("600.0pt"), "{msg}");
        assert!(msg.contains("500.0pt"), "{msg}");
    }
}
