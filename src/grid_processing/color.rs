use image::{Rgb, Rgba};
use regex::Regex;
use std::sync::LazyLock;

/// Cells written by the converter: `#RRGGBB`, uppercase.
static CANONICAL_HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-F]{6}$").expect("valid regex"));

/// Cells accepted when reading grid documents produced by other tools.
static LOOSE_HEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("valid regex")
});

/// Format a channel triple as `#RRGGBB`.
///
/// Each channel is clamped to `[0, 255]` independently.
pub fn format_hex(r: i64, g: i64, b: i64) -> String {
    let clamp = |c: i64| c.clamp(0, 255) as u8;
    format!("#{:02X}{:02X}{:02X}", clamp(r), clamp(g), clamp(b))
}

pub fn format_rgb(pixel: &Rgb<u8>) -> String {
    let [r, g, b] = pixel.0;
    format_hex(r.into(), g.into(), b.into())
}

/// True for cells the converter itself would emit.
pub fn is_canonical(cell: &str) -> bool {
    CANONICAL_HEX.is_match(cell)
}

/// True for empty cells or any 3/4/6/8 digit hex color.
pub fn is_acceptable_cell(cell: &str) -> bool {
    cell.is_empty() || LOOSE_HEX.is_match(cell)
}

/// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
pub fn parse_color(cell: &str) -> Option<Rgba<u8>> {
    if !LOOSE_HEX.is_match(cell) {
        return None;
    }
    let hex = cell.trim_start_matches('#');

    // Short forms double every digit: "F08" -> "FF0088"
    let expanded: String = if hex.len() <= 4 {
        hex.chars().flat_map(|c| [c, c]).collect()
    } else {
        hex.to_string()
    };

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    let r = channel(0)?;
    let g = channel(2)?;
    let b = channel(4)?;
    let a = if expanded.len() == 8 { channel(6)? } else { 255 };

    Some(Rgba([r, g, b, a]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hex_clamps_each_channel() {
        assert_eq!(format_hex(-10, 300, 128), "#00FF80");
        assert_eq!(format_hex(255, 255, 255), "#FFFFFF");
        assert_eq!(format_hex(0, 0, 0), "#000000");
        assert_eq!(format_hex(10, 171, 205), "#0AABCD");
    }

    #[test]
    fn test_format_rgb_is_canonical() {
        let cell = format_rgb(&Rgb([18, 52, 171]));
        assert_eq!(cell, "#1234AB");
        assert!(is_canonical(&cell));
        assert_eq!(format_rgb(&Rgb([0, 255, 10])), format_hex(0, 255, 10));
    }

    #[test]
    fn test_is_canonical() {
        assert!(is_canonical("#FF0000"));
        assert!(!is_canonical("#ff0000"));
        assert!(!is_canonical("FF0000"));
        assert!(!is_canonical("#F00"));
        assert!(!is_canonical("#FF000000"));
    }

    #[test]
    fn test_is_acceptable_cell() {
        assert!(is_acceptable_cell(""));
        assert!(is_acceptable_cell("#abc"));
        assert!(is_acceptable_cell("abcd"));
        assert!(is_acceptable_cell("#00FF0080"));
        assert!(!is_acceptable_cell("#12345"));
        assert!(!is_acceptable_cell("#GG0000"));
        assert!(!is_acceptable_cell("red"));
    }

    #[test]
    fn test_parse_color_forms() {
        assert_eq!(parse_color("#F00"), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(parse_color("#f008"), Some(Rgba([255, 0, 0, 136])));
        assert_eq!(parse_color("00FF80"), Some(Rgba([0, 255, 128, 255])));
        assert_eq!(parse_color("#FF000080"), Some(Rgba([255, 0, 0, 128])));
        assert_eq!(parse_color(""), None);
        assert_eq!(parse_color("#12"), None);
    }
}
