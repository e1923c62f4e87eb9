//! # Font Metrics
//!
//! The engine never parses font files. It consumes precomputed advance
//! widths through the `FontMetrics` seam; `BuiltinFonts` implements the
//! seam with the Adobe AFM width tables for the Helvetica family and the
//! fixed-pitch Courier family, so documents measure identically everywhere
//! without any font data on disk.
//!
//! Widths are expressed in 1/1000 em units, the AFM convention; the advance
//! at a given size is `units / 1000 * size`.

/// Character advance widths for a set of named fonts.
///
/// Implementations must be deterministic: the same (font, char, size)
/// always yields the same width. Table row heights depend on repeated
/// measurement calls agreeing exactly.
pub trait FontMetrics {
    /// Advance width of `ch` in points when set in `font_name` at
    /// `font_size` points.
    fn char_width(&self, font_name: &str, ch: char, font_size: f64) -> f64;

    /// Total advance width of `text`.
    fn text_width(&self, font_name: &str, text: &str, font_size: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(font_name, ch, font_size))
            .sum()
    }
}

/// Built-in AFM metrics for the standard Helvetica and Courier families.
///
/// Oblique/italic variants share their upright widths, as in the AFM files.
/// Unrecognized font names fall back to Helvetica; glyphs outside printable
/// ASCII are approximated by a medium advance.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFonts;

/// Advance for glyphs we have no table entry for.
const FALLBACK_WIDTH: u16 = 556;

/// Every Courier glyph is 600 units wide.
const COURIER_WIDTH: u16 = 600;

impl FontMetrics for BuiltinFonts {
    fn char_width(&self, font_name: &str, ch: char, font_size: f64) -> f64 {
        let units = if font_name.starts_with("Courier") {
            COURIER_WIDTH
        } else {
            let table = if font_name.contains("Bold") {
                &HELVETICA_BOLD
            } else {
                &HELVETICA
            };
            let code = ch as u32;
            if (0x20..=0x7E).contains(&code) {
                table[(code - 0x20) as usize]
            } else {
                FALLBACK_WIDTH
            }
        };
        units as f64 / 1000.0 * font_size
    }
}

/// Helvetica AFM advance widths for 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

/// Helvetica-Bold AFM advance widths for 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];
