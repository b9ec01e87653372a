use std::rc::Rc;

use crate::pixel_buffer::{PixelBuffer, Region};

/// One character's image plus the layout data needed to place it.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub character: char,
    /// Image the glyph lives in. Sheet glyphs share one buffer.
    pub buffer: Rc<PixelBuffer>,
    /// Area of `buffer` holding the glyph.
    pub region: Region,
    /// Pixels to shift right from the pen position when drawing.
    pub offset_x: f32,
    /// Pixels to shift down from the line top when drawing.
    pub offset_y: f32,
    /// Extra pen movement after the glyph's width.
    pub advance_x: f32,
}

impl Glyph {
    pub fn new(character: char, buffer: Rc<PixelBuffer>, region: Region) -> Self {
        Self {
            character,
            buffer,
            region,
            offset_x: 0.0,
            offset_y: 0.0,
            advance_x: 0.0,
        }
    }

    /// Glyph covering all of `buffer`.
    pub fn whole(character: char, buffer: PixelBuffer) -> Self {
        let region = buffer.bounds();
        Self::new(character, Rc::new(buffer), region)
    }
}

/// Successor used when a sheet has more cells than requested characters.
/// Skips the surrogate block and stays at `char::MAX` once reached.
pub fn next_character(character: char) -> char {
    match character {
        '\u{D7FF}' => '\u{E000}',
        char::MAX => char::MAX,
        other => char::from_u32(other as u32 + 1).unwrap_or(char::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_glyph_covers_its_buffer() {
        let glyph = Glyph::whole('x', PixelBuffer::new(3, 5));
        assert_eq!(glyph.region, Region::new(0, 0, 3, 5));
        assert_eq!((glyph.offset_x, glyph.offset_y, glyph.advance_x), (0.0, 0.0, 0.0));
    }

    #[test]
    fn next_character_counts_up_and_skips_surrogates() {
        assert_eq!(next_character('A'), 'B');
        assert_eq!(next_character('\0'), '\u{1}');
        assert_eq!(next_character('\u{D7FF}'), '\u{E000}');
        assert_eq!(next_character(char::MAX), char::MAX);
    }
}
