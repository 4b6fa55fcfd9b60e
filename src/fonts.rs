//! Helvetica-Bold glyph metrics and WinAnsi encoding
//!
//! Labels are drawn with the standard-14 Helvetica-Bold font, which every PDF
//! viewer provides without embedding. Text placement needs its advance widths,
//! and the content stream needs the text as single-byte WinAnsi codes.

/// Base font name written into the font dictionary
pub const BASE_FONT: &str = "Helvetica-Bold";

/// First character code covered by [`HELVETICA_BOLD_WIDTHS`]
const FIRST_CHAR: u8 = 32;

/// Helvetica-Bold advance widths for WinAnsi codes 32-255, in 1/1000 em.
/// `0` marks codes with no glyph in WinAnsiEncoding.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 224] = [
    // 32-63: space ! " # $ % & ' ( ) * + , - . / 0-9 : ; < = > ?
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    // 64-95: @ A-Z [ \ ] ^ _
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    // 96-127: ` a-z { | } ~ DEL
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 0,
    // 128-159: Euro, quotes, daggers, Scaron, OE, Zcaron, dashes, trademark...
    556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667,
    // 160-191: nbsp, inverted !, currency signs, section, copyright...
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    // 192-223: accented capitals
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    // 224-255: accented lowercase
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

/// Map a character to its WinAnsiEncoding code, if the encoding has one
pub fn win_ansi_code(ch: char) -> Option<u8> {
    let code = match ch {
        ' '..='~' => ch as u8,
        '\u{A0}'..='\u{FF}' => ch as u32 as u8,
        '\u{20AC}' => 128,
        '\u{201A}' => 130,
        '\u{0192}' => 131,
        '\u{201E}' => 132,
        '\u{2026}' => 133,
        '\u{2020}' => 134,
        '\u{2021}' => 135,
        '\u{02C6}' => 136,
        '\u{2030}' => 137,
        '\u{0160}' => 138,
        '\u{2039}' => 139,
        '\u{0152}' => 140,
        '\u{017D}' => 142,
        '\u{2018}' => 145,
        '\u{2019}' => 146,
        '\u{201C}' => 147,
        '\u{201D}' => 148,
        '\u{2022}' => 149,
        '\u{2013}' => 150,
        '\u{2014}' => 151,
        '\u{02DC}' => 152,
        '\u{2122}' => 153,
        '\u{0161}' => 154,
        '\u{203A}' => 155,
        '\u{0153}' => 156,
        '\u{017E}' => 158,
        '\u{0178}' => 159,
        _ => return None,
    };
    Some(code)
}

/// Advance width of a WinAnsi code in 1/1000 em (0 if there is no glyph)
pub fn code_width(code: u8) -> u16 {
    code.checked_sub(FIRST_CHAR)
        .and_then(|i| HELVETICA_BOLD_WIDTHS.get(i as usize))
        .copied()
        .unwrap_or(0)
}

/// Encode text for a WinAnsi `Tj` operand, dropping characters with no glyph
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter_map(|ch| {
            let code = win_ansi_code(ch).filter(|&c| code_width(c) > 0);
            if code.is_none() {
                log::debug!("No {} glyph for {:?}, skipping", BASE_FONT, ch);
            }
            code
        })
        .collect()
}

/// Sum of glyph widths in 1/1000 em; unknown characters count as zero
pub fn string_width_units(text: &str) -> f32 {
    text.chars()
        .filter_map(win_ansi_code)
        .map(|code| code_width(code) as f32)
        .sum()
}

/// Rendered width of `text` at `font_size`
pub fn string_width(text: &str, font_size: f32) -> f32 {
    string_width_units(text) / 1000.0 * font_size
}
