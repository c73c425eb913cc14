//! Helvetica glyph widths and greedy word wrapping.
//!
//! Widths are the standard Adobe core-font metrics in 1/1000 em for ASCII
//! 32..=126. Anything outside that range is measured as a digit.

const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

const FALLBACK_WIDTH: u16 = 556;
const PT_TO_MM: f32 = 25.4 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

fn glyph(c: char, style: FontStyle) -> u16 {
    let table = match style {
        FontStyle::Bold => &HELVETICA_BOLD,
        // Oblique shares the upright metrics.
        FontStyle::Regular | FontStyle::Italic => &HELVETICA,
    };
    let code = c as u32;
    if (32..=126).contains(&code) {
        table[(code - 32) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

/// Rendered width of `text` in millimetres.
pub fn text_width(text: &str, size_pt: f32, style: FontStyle) -> f32 {
    let units: u32 = text.chars().map(|c| glyph(c, style) as u32).sum();
    units as f32 / 1000.0 * size_pt * PT_TO_MM
}

pub fn pt_to_mm(size_pt: f32) -> f32 {
    size_pt * PT_TO_MM
}

/// Break `text` into lines no wider than `max_width` mm.
///
/// Explicit newlines are kept. Words wider than a whole line are split
/// between characters. Empty input yields a single empty line.
pub fn wrap(text: &str, max_width: f32, size_pt: f32, style: FontStyle) -> Vec<String> {
    let fits = |s: &str| text_width(s, size_pt, style) <= max_width;
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if fits(&candidate) {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if fits(word) {
                line = word.to_string();
                continue;
            }
            for c in word.chars() {
                line.push(c);
                if !fits(&line) && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::take(&mut line));
                    line.push(c);
                }
            }
        }
        lines.push(line);
    }
    lines
}
