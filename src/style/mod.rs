//! # Style System
//!
//! Named paragraph styles with single-inheritance composition. A `Style` is
//! a sparse set of overrides plus an optional `base` reference; resolution
//! is a shallow per-field merge down the base chain into a fully concrete
//! `ResolvedStyle`.
//!
//! Styles are immutable value records held in an owned `StyleSheet` and
//! referenced by name from content blocks. Composing a derived style creates
//! a new record; nothing is shared or mutated after construction.

use crate::error::LayoutError;
use crate::model::Edges;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DEFAULT_FONT: &str = "Helvetica";
const DEFAULT_FONT_SIZE: f64 = 10.0;
/// Default leading is 1.2× the font size, applied when no style in the
/// chain sets an explicit leading.
const DEFAULT_LEADING_RATIO: f64 = 1.2;

/// A sparse style: unset fields inherit from `base` (or the defaults when
/// there is no base).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Name of the style this one derives from.
    pub base: Option<String>,

    /// Font name, e.g. "Helvetica-Bold" or "Courier".
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<f64>,
    /// Baseline-to-baseline distance in points. Constant per style; line
    /// height never varies with glyph content.
    pub leading: Option<f64>,

    /// Text fill color.
    pub color: Option<Color>,
    /// Horizontal alignment of wrapped lines.
    pub alignment: Option<Align>,

    /// Padding around the paragraph text.
    pub padding: Option<Edges>,
    /// Background fill behind the paragraph box.
    pub background: Option<Color>,
    /// Border drawn around the paragraph box.
    pub border: Option<BorderSpec>,

    /// Vertical gap inserted before the block (suppressed at the top of a
    /// page).
    pub space_before: Option<f64>,
    /// Vertical gap inserted after the block.
    pub space_after: Option<f64>,
}

impl Style {
    /// A style deriving from `base` with no overrides yet. Fields are set
    /// with struct-update syntax at the call site.
    pub fn derived(base: &str) -> Self {
        Self {
            base: Some(base.to_string()),
            ..Self::default()
        }
    }

    /// Overlay `over`'s set fields onto `self`. Shallow merge: override
    /// wins per field.
    fn apply(&mut self, over: &Style) {
        if over.font_name.is_some() {
            self.font_name = over.font_name.clone();
        }
        if over.font_size.is_some() {
            self.font_size = over.font_size;
        }
        if over.leading.is_some() {
            self.leading = over.leading;
        }
        if over.color.is_some() {
            self.color = over.color;
        }
        if over.alignment.is_some() {
            self.alignment = over.alignment;
        }
        if over.padding.is_some() {
            self.padding = over.padding;
        }
        if over.background.is_some() {
            self.background = over.background;
        }
        if over.border.is_some() {
            self.border = over.border;
        }
        if over.space_before.is_some() {
            self.space_before = over.space_before;
        }
        if over.space_after.is_some() {
            self.space_after = over.space_after;
        }
    }

    fn into_resolved(self) -> ResolvedStyle {
        let font_size = self.font_size.unwrap_or(DEFAULT_FONT_SIZE);
        ResolvedStyle {
            font_name: self.font_name.unwrap_or_else(|| DEFAULT_FONT.to_string()),
            font_size,
            leading: self.leading.unwrap_or(font_size * DEFAULT_LEADING_RATIO),
            color: self.color.unwrap_or(Color::BLACK),
            alignment: self.alignment.unwrap_or_default(),
            padding: self.padding.unwrap_or_default(),
            background: self.background,
            border: self.border,
            space_before: self.space_before.unwrap_or(0.0),
            space_after: self.space_after.unwrap_or(0.0),
        }
    }
}

/// A fully concrete style: every field has a value. This is what the layout
/// engine works with after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub font_name: String,
    pub font_size: f64,
    pub leading: f64,
    pub color: Color,
    pub alignment: Align,
    pub padding: Edges,
    pub background: Option<Color>,
    pub border: Option<BorderSpec>,
    pub space_before: f64,
    pub space_after: f64,
}

/// Horizontal alignment of wrapped lines within the paragraph width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Border width and color for a paragraph box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderSpec {
    pub width: f64,
    pub color: Color,
}

/// The owned name → style table. Blocks reference styles by name key; the
/// table is resolved once before layout begins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSheet {
    styles: HashMap<String, Style>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, style: Style) {
        self.styles.insert(name.to_string(), style);
    }

    pub fn get(&self, name: &str) -> Option<&Style> {
        self.styles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    /// Resolve one named style by folding its base chain root-first.
    /// Fails on an unknown name anywhere in the chain, or on a cycle.
    pub fn resolve(&self, name: &str) -> Result<ResolvedStyle, LayoutError> {
        let mut chain: Vec<&Style> = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        let mut current = Some(name);

        while let Some(n) = current {
            if seen.contains(&n) {
                return Err(LayoutError::StyleCycle {
                    name: n.to_string(),
                });
            }
            let style = self.styles.get(n).ok_or_else(|| LayoutError::UnknownStyle {
                name: n.to_string(),
            })?;
            seen.push(n);
            chain.push(style);
            current = style.base.as_deref();
        }

        let mut merged = Style::default();
        for style in chain.iter().rev() {
            merged.apply(style);
        }
        Ok(merged.into_resolved())
    }

    /// Resolve every style in the sheet. Used by the validation pass so
    /// broken references surface before any page is emitted.
    pub fn resolve_all(&self) -> Result<HashMap<String, ResolvedStyle>, LayoutError> {
        let mut resolved = HashMap::with_capacity(self.styles.len());
        for name in self.styles.keys() {
            resolved.insert(name.clone(), self.resolve(name)?);
        }
        Ok(resolved)
    }
}

/// An RGBA color, components in 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).unwrap_or(0);
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                (r, g, b)
            }
            _ => (0, 0, 0),
        };
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> StyleSheet {
        let mut sheet = StyleSheet::new();
        sheet.insert(
            "body",
            Style {
                font_name: Some("Helvetica".to_string()),
                font_size: Some(9.0),
                leading: Some(13.0),
                color: Some(Color::hex("#999999")),
                ..Style::default()
            },
        );
        sheet.insert(
            "note",
            Style {
                font_size: Some(8.0),
                ..Style::derived("body")
            },
        );
        sheet
    }

    #[test]
    fn bare_style_gets_defaults() {
        let mut sheet = StyleSheet::new();
        sheet.insert("plain", Style::default());
        let resolved = sheet.resolve("plain").unwrap();
        assert_eq!(resolved.font_name, "Helvetica");
        assert_eq!(resolved.font_size, 10.0);
        assert_eq!(resolved.leading, 12.0);
        assert_eq!(resolved.alignment, Align::Left);
        assert_eq!(resolved.color, Color::BLACK);
    }

    #[test]
    fn override_wins_unset_inherits() {
        let resolved = sheet().resolve("note").unwrap();
        // Overridden
        assert_eq!(resolved.font_size, 8.0);
        // Inherited from base
        assert_eq!(resolved.leading, 13.0);
        assert_eq!(resolved.color, Color::hex("#999999"));
    }

    #[test]
    fn derived_style_leaves_base_untouched() {
        let sheet = sheet();
        let _ = sheet.resolve("note").unwrap();
        let base = sheet.resolve("body").unwrap();
        assert_eq!(base.font_size, 9.0);
    }

    #[test]
    fn leading_defaults_track_font_size() {
        let mut sheet = StyleSheet::new();
        sheet.insert(
            "big",
            Style {
                font_size: Some(28.0),
                ..Style::default()
            },
        );
        let resolved = sheet.resolve("big").unwrap();
        assert!((resolved.leading - 33.6).abs() < 1e-9);
    }

    #[test]
    fn unknown_base_is_configuration_error() {
        let mut sheet = StyleSheet::new();
        sheet.insert("orphan", Style::derived("missing"));
        match sheet.resolve("orphan") {
            Err(LayoutError::UnknownStyle { name }) => assert_eq!(name, "missing"),
            other => panic!("expected UnknownStyle, got {:?}", other),
        }
    }

    #[test]
    fn base_cycle_is_detected() {
        let mut sheet = StyleSheet::new();
        sheet.insert("a", Style::derived("b"));
        sheet.insert("b", Style::derived("a"));
        assert!(matches!(
            sheet.resolve("a"),
            Err(LayoutError::StyleCycle { .. })
        ));
    }

    #[test]
    fn resolve_all_covers_every_name() {
        let resolved = sheet().resolve_all().unwrap();
        assert_eq!(resolved.len(), 2);
        assert!(resolved.contains_key("body"));
        assert!(resolved.contains_key("note"));
    }

    #[test]
    fn hex_color_parsing() {
        let c = Color::hex("#ff0000");
        assert!((c.r - 1.0).abs() < 0.01);
        assert!((c.g - 0.0).abs() < 0.01);

        let c = Color::hex("00ff00");
        assert!((c.g - 1.0).abs() < 0.01);

        let c = Color::hex("#abc");
        assert!((c.r - 0xAA as f64 / 255.0).abs() < 0.01);
        assert!((c.b - 0xCC as f64 / 255.0).abs() < 0.01);
    }
}
