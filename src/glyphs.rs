//! Large ASCII-art digits for the countdown.
//!
//! Glyphs are built once and every frame is padded to the size of the widest
//! possible reading, so the block never changes dimensions between frames,
//! including blanked ones. The countdown tops out at "999:59".

use std::collections::HashMap;

/// Widest readings the frame is sized for
const SIZING_SAMPLES: &[&str] = &["-88:88", "888:88"];

/// Width of the space glyph when no digit is available to measure
const FALLBACK_SPACE_WIDTH: usize = 8;

const FONT: &[(char, &[&str])] = &[
    ('0', &["  ___  ", " / _ \\ ", "| | | |", "| |_| |", " \\___/ "]),
    ('1', &[" _ ", "/ |", "| |", "| |", "|_|"]),
    ('2', &[" ____  ", "|___ \\ ", "  __) |", " / __/ ", "|_____|"]),
    ('3', &[" _____ ", "|___ / ", "  |_ \\ ", " ___) |", "|____/ "]),
    ('4', &[" _  _   ", "| || |  ", "| || |_ ", "|__   _|", "   |_|  "]),
    ('5', &[" ____  ", "| ___| ", "|___ \\ ", " ___) |", "|____/ "]),
    ('6', &["  __   ", " / /_  ", "| '_ \\ ", "| (_) |", " \\___/ "]),
    ('7', &[" _____ ", "|___  |", "   / / ", "  / /  ", " /_/   "]),
    ('8', &["  ___  ", " ( _ ) ", " / _ \\ ", "| (_) |", " \\___/ "]),
    ('9', &["  ___  ", " / _ \\ ", "| (_) |", " \\__, |", "   /_/ "]),
    (':', &["   ", " _ ", "(_)", " _ ", "(_)"]),
    ('-', &["        ", "        ", " _____ ", "|_____|"]),
];

pub struct GlyphRenderer {
    glyphs: HashMap<char, Vec<String>>,
    width: usize,
    height: usize,
}

impl GlyphRenderer {
    pub fn new() -> Self {
        let (glyphs, height) = build_glyphs(FONT);
        let mut renderer = Self {
            glyphs,
            width: 0,
            height,
        };
        renderer.width = SIZING_SAMPLES
            .iter()
            .filter_map(|sample| renderer.render(sample, true, true).lines().next().map(str::len))
            .max()
            .unwrap_or(0);
        renderer
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Compose `text` into a `height`-line block.
    ///
    /// `visible == false` yields an all-blank block of the same size. Unknown
    /// characters render as blanks.
    pub fn render(&self, text: &str, visible: bool, colon_visible: bool) -> String {
        if !visible {
            return vec![" ".repeat(self.width); self.height].join("\n");
        }

        let mut lines = vec![String::new(); self.height];
        for ch in text.chars() {
            let Some(glyph) = self.glyphs.get(&ch).or_else(|| self.glyphs.get(&' ')) else {
                continue;
            };
            for (line, row) in lines.iter_mut().zip(glyph) {
                if ch == ':' && !colon_visible {
                    line.push_str(&" ".repeat(row.len()));
                } else {
                    line.push_str(row);
                }
            }
        }

        for line in &mut lines {
            pad_right(line, self.width);
        }
        lines.join("\n")
    }
}

impl Default for GlyphRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Pad every glyph to its own width and the font's tallest height, then add a
/// digit-wide blank for space
fn build_glyphs(font: &[(char, &[&str])]) -> (HashMap<char, Vec<String>>, usize) {
    let mut glyphs = HashMap::with_capacity(font.len() + 1);
    let mut max_height = 0;

    for (ch, rows) in font {
        let mut rows: Vec<String> = rows.iter().map(|row| (*row).to_string()).collect();
        if rows.is_empty() {
            rows.push(String::new());
        }
        let width = rows.iter().map(String::len).max().unwrap_or(0).max(1);
        for row in &mut rows {
            pad_right(row, width);
        }
        max_height = max_height.max(rows.len());
        glyphs.insert(*ch, rows);
    }

    for rows in glyphs.values_mut() {
        let width = rows[0].len();
        rows.resize(max_height, " ".repeat(width));
    }

    let space_width = glyphs
        .get(&'0')
        .and_then(|rows| rows.first())
        .map_or(0, String::len);
    let space_width = if space_width == 0 {
        FALLBACK_SPACE_WIDTH
    } else {
        space_width
    };
    glyphs.insert(' ', vec![" ".repeat(space_width); max_height]);

    (glyphs, max_height)
}

fn pad_right(line: &mut String, width: usize) {
    let len = line.len();
    if len < width {
        line.push_str(&" ".repeat(width - len));
    }
}
