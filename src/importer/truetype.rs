use std::fs;

use anyhow::Result;
use fontdue::{Font, FontSettings};
use log::debug;

use super::{FontImporter, ImportedFont};
use crate::config::{FontStyle, ImportOptions};
use crate::error_codes::CodedError;
use crate::glyph::Glyph;
use crate::pixel_buffer::{Argb, LockMode, PixelBuffer};

/// Rasterizes the requested characters from a TrueType/OpenType file.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrueTypeImporter;

impl FontImporter for TrueTypeImporter {
    fn import(&self, options: &ImportOptions) -> Result<ImportedFont> {
        let path = &options.source_font;
        let bytes = fs::read(path).map_err(|error| CodedError::decode(path, error))?;
        let settings = FontSettings {
            scale: options.font_size,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(bytes, settings)
            .map_err(|error| CodedError::decode(path, error))?;

        let size = options.font_size;
        let (ascent, line_spacing) = match font.horizontal_line_metrics(size) {
            Some(line) => (line.ascent, line.new_line_size),
            None => (size, size),
        };

        let mut glyphs = Vec::with_capacity(options.characters.len());
        for &character in &options.characters {
            if font.lookup_glyph_index(character) == 0 {
                debug!(
                    "{} has no glyph for U+{:04X}; skipping",
                    path.display(),
                    character as u32
                );
                continue;
            }

            let (metrics, bitmap) = font.rasterize(character, size);
            let placement = Placement {
                xmin: metrics.xmin,
                ymin: metrics.ymin,
                width: metrics.width,
                height: metrics.height,
                advance: metrics.advance_width,
            };
            glyphs.push(rasterized_glyph(
                character,
                &placement,
                bitmap,
                ascent,
                options.font_style,
                options.sharp,
            ));
        }

        Ok(ImportedFont {
            glyphs,
            line_spacing,
        })
    }
}

/// Where a rasterized bitmap sits relative to the pen, in pixels with y up.
#[derive(Debug, Clone, Copy)]
struct Placement {
    xmin: i32,
    ymin: i32,
    width: usize,
    height: usize,
    advance: f32,
}

fn rasterized_glyph(
    character: char,
    placement: &Placement,
    bitmap: Vec<u8>,
    ascent: f32,
    style: FontStyle,
    sharp: bool,
) -> Glyph {
    let mut advance = placement.advance;

    if placement.width == 0 || placement.height == 0 {
        let mut glyph = Glyph::whole(character, PixelBuffer::new(1, 1));
        glyph.advance_x = advance - 1.0;
        return glyph;
    }

    let mut coverage = Coverage {
        width: placement.width,
        height: placement.height,
        values: bitmap,
    };
    if sharp {
        coverage.threshold();
    }
    if style.is_bold() {
        coverage = coverage.embolden();
        advance += 1.0;
    }
    if style.is_italic() {
        coverage = coverage.slant();
    }

    let width = coverage.width as f32;
    let mut glyph = Glyph::whole(character, coverage.into_buffer());
    glyph.offset_x = placement.xmin as f32;
    glyph.offset_y = ascent - (placement.ymin as f32 + placement.height as f32);
    glyph.advance_x = advance - placement.xmin as f32 - width;
    glyph
}

/// Row-major 8-bit coverage mask.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Coverage {
    width: usize,
    height: usize,
    values: Vec<u8>,
}

impl Coverage {
    fn at(&self, x: usize, y: usize) -> u8 {
        self.values[y * self.width + x]
    }

    fn threshold(&mut self) {
        for value in &mut self.values {
            *value = if *value >= 128 { 255 } else { 0 };
        }
    }

    /// One pixel wider; every column also takes the coverage of its left
    /// neighbour.
    fn embolden(&self) -> Self {
        let width = self.width + 1;
        let mut values = vec![0; width * self.height];
        for y in 0..self.height {
            for x in 0..width {
                let here = if x < self.width { self.at(x, y) } else { 0 };
                let left = if x > 0 { self.at(x - 1, y) } else { 0 };
                values[y * width + x] = here.max(left);
            }
        }
        Self {
            width,
            height: self.height,
            values,
        }
    }

    /// Shears rows right by a quarter pixel per row above the bottom row.
    fn slant(&self) -> Self {
        let lean = |y: usize| (self.height - 1 - y) / 4;
        let width = self.width + lean(0);
        let mut values = vec![0; width * self.height];
        for y in 0..self.height {
            let shift = lean(y);
            for x in 0..self.width {
                values[y * width + x + shift] = self.at(x, y);
            }
        }
        Self {
            width,
            height: self.height,
            values,
        }
    }

    fn into_buffer(self) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(self.width as u32, self.height as u32);
        {
            let mut view = buffer.lock(LockMode::WriteOnly, None);
            for y in 0..self.height {
                for x in 0..self.width {
                    view.set(x as u32, y as u32, Argb::WHITE.with_alpha(self.at(x, y)));
                }
            }
        }
        buffer
    }
}
