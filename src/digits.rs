//! Block-character font for the large countdown display.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Rows per glyph.
pub const HEIGHT: usize = 5;

type Glyph = [&'static str; HEIGHT];

static GLYPHS: Lazy<HashMap<char, Glyph>> = Lazy::new(|| {
    HashMap::from([
        ('0', ["███", "█ █", "█ █", "█ █", "███"]),
        ('1', ["  █", "  █", "  █", "  █", "  █"]),
        ('2', ["███", "  █", "███", "█  ", "███"]),
        ('3', ["███", "  █", "███", "  █", "███"]),
        ('4', ["█ █", "█ █", "███", "  █", "  █"]),
        ('5', ["███", "█  ", "███", "  █", "███"]),
        ('6', ["███", "█  ", "███", "█ █", "███"]),
        ('7', ["███", "  █", "  █", "  █", "  █"]),
        ('8', ["███", "█ █", "███", "█ █", "███"]),
        ('9', ["███", "█ █", "███", "  █", "███"]),
        (':', [" ", "█", " ", "█", " "]),
    ])
});

const BLANK: Glyph = ["   "; HEIGHT];

/// Renders `text` as [`HEIGHT`] lines of block characters, one space between
/// glyphs. Characters without a glyph render as blank space.
pub fn render(text: &str) -> String {
    let glyphs: Vec<&Glyph> = text
        .chars()
        .map(|c| GLYPHS.get(&c).unwrap_or(&BLANK))
        .collect();

    (0..HEIGHT)
        .map(|row| {
            glyphs
                .iter()
                .map(|g| g[row])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
