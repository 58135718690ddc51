//! Advance widths for the standard Helvetica faces.
//!
//! Widths are in 1/1000 em for printable ASCII (0x20..=0x7E), taken from
//! the Adobe core font metrics. Other characters use the digit width.

use super::layout::FontFace;

const FIRST: u32 = 0x20;
const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn char_width(table: &[u16; 95], c: char) -> u16 {
    (c as u32)
        .checked_sub(FIRST)
        .and_then(|i| table.get(i as usize))
        .copied()
        .unwrap_or(FALLBACK_WIDTH)
}

/// Width of `text` in points at `size`.
pub fn text_width(text: &str, face: FontFace, size: f32) -> f32 {
    let table = match face {
        FontFace::Regular => &HELVETICA,
        FontFace::Bold => &HELVETICA_BOLD,
    };
    let units: u32 = text.chars().map(|c| u32::from(char_width(table, c))).sum();
    units as f32 * size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        // "Rx" in Helvetica: 722 + 500
        assert!((text_width("Rx", FontFace::Regular, 10.0) - 12.22).abs() < 1e-3);
        // Bold digits are the same width as regular
        assert_eq!(
            text_width("2024", FontFace::Bold, 12.0),
            text_width("2024", FontFace::Regular, 12.0)
        );
    }

    #[test]
    fn test_empty_and_non_ascii() {
        assert_eq!(text_width("", FontFace::Regular, 12.0), 0.0);
        assert_eq!(text_width("é", FontFace::Regular, 1000.0), 556.0);
    }

    #[test]
    fn test_bold_is_wider() {
        let s = "Prescription";
        assert!(text_width(s, FontFace::Bold, 11.0) > text_width(s, FontFace::Regular, 11.0));
    }
}
