use std::rc::Rc;

use anyhow::Result;
use log::{debug, warn};

use super::{FontImporter, ImportedFont};
use crate::bitmap_ops::{grey_to_alpha, matches_alpha};
use crate::config::ImportOptions;
use crate::glyph::{next_character, Glyph};
use crate::marker_scan::{glyph_regions, is_marker_color};
use crate::pixel_buffer::PixelBuffer;

/// Reads glyphs from a sheet where every character sits in its own cell,
/// separated by magenta (255, 0, 255) marker pixels and laid out top-left to
/// bottom-right. Monochrome sheets use white for ink and black for empty
/// space; sheets with a real alpha channel keep their colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapImporter;

impl FontImporter for BitmapImporter {
    fn import(&self, options: &ImportOptions) -> Result<ImportedFont> {
        let sheet = PixelBuffer::open(&options.source_font)?;
        debug!(
            "decoded {} ({}x{})",
            options.source_font.display(),
            sheet.width(),
            sheet.height()
        );
        Ok(import_sheet(sheet, &options.characters))
    }
}

/// Splits a decoded sheet into glyphs. Cells are assigned `characters` in
/// order; cells beyond the requested characters keep counting up from the
/// last assigned character.
pub fn import_sheet(mut sheet: PixelBuffer, characters: &[char]) -> ImportedFont {
    let regions = glyph_regions(&sheet, is_marker_color);

    // A sheet that is opaque everywhere has no alpha channel of its own.
    if matches_alpha(255, &sheet, None) {
        debug!("sheet is fully opaque; deriving alpha from brightness");
        grey_to_alpha(&mut sheet);
    }

    if regions.len() > characters.len() {
        warn!(
            "sheet has {} glyph cells but only {} characters were requested; numbering the rest sequentially",
            regions.len(),
            characters.len()
        );
    }

    let sheet = Rc::new(sheet);
    let mut character = '\0';
    let mut line_spacing = 0;
    let glyphs = regions
        .into_iter()
        .enumerate()
        .map(|(index, region)| {
            character = match characters.get(index) {
                Some(&requested) => requested,
                None => next_character(character),
            };
            line_spacing = line_spacing.max(region.height);
            Glyph::new(character, Rc::clone(&sheet), region)
        })
        .collect();

    ImportedFont {
        glyphs,
        line_spacing: line_spacing as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker_scan::MARKER_COLOR;
    use crate::pixel_buffer::{Argb, LockMode, Region};

    fn sheet_with_cells(width: u32, height: u32, cells: &[(Region, Argb)]) -> PixelBuffer {
        let mut sheet = PixelBuffer::filled(width, height, MARKER_COLOR);
        for &(cell, color) in cells {
            sheet
                .lock(LockMode::ReadWrite, Some(cell))
                .map_in_place(|_| color);
        }
        sheet
    }

    fn characters(font: &ImportedFont) -> Vec<char> {
        font.glyphs.iter().map(|glyph| glyph.character).collect()
    }

    #[test]
    fn one_white_pixel_sheet_yields_one_glyph() {
        let sheet = sheet_with_cells(3, 3, &[(Region::new(1, 1, 1, 1), Argb::WHITE)]);
        let font = import_sheet(sheet, &['A']);

        assert_eq!(characters(&font), vec!['A']);
        assert_eq!(font.glyphs[0].region, Region::new(1, 1, 1, 1));
        assert_eq!(font.line_spacing, 1.0);
    }

    #[test]
    fn line_spacing_is_tallest_cell() {
        let sheet = sheet_with_cells(
            8,
            6,
            &[
                (Region::new(1, 1, 2, 3), Argb::WHITE),
                (Region::new(4, 1, 3, 4), Argb::WHITE),
            ],
        );
        let font = import_sheet(sheet, &['a', 'b']);
        assert_eq!(font.line_spacing, 4.0);
    }

    #[test]
    fn extra_cells_count_up_from_last_requested_character() {
        let cells = (0..4)
            .map(|index| (Region::new(1 + index * 2, 1, 1, 1), Argb::WHITE))
            .collect::<Vec<_>>();
        let sheet = sheet_with_cells(10, 3, &cells);

        let font = import_sheet(sheet, &['x', 'M']);
        assert_eq!(characters(&font), vec!['x', 'M', 'N', 'O']);
    }

    #[test]
    fn fewer_cells_than_characters_uses_a_prefix() {
        let sheet = sheet_with_cells(3, 3, &[(Region::new(1, 1, 1, 1), Argb::WHITE)]);
        let font = import_sheet(sheet, &['A', 'B', 'C']);
        assert_eq!(characters(&font), vec!['A']);
    }

    #[test]
    fn opaque_sheet_gets_alpha_from_brightness() {
        let grey = Argb::from_argb(255, 90, 90, 90);
        let sheet = sheet_with_cells(3, 3, &[(Region::new(1, 1, 1, 1), grey)]);
        let font = import_sheet(sheet, &['A']);

        let glyph = &font.glyphs[0];
        assert_eq!(
            glyph.buffer.read(Some(glyph.region)).get(0, 0),
            Argb::from_argb(90, 255, 255, 255)
        );
    }

    #[test]
    fn sheet_with_alpha_keeps_its_colors() {
        let translucent_red = Argb::from_argb(128, 255, 0, 0);
        let sheet = sheet_with_cells(3, 3, &[(Region::new(1, 1, 1, 1), translucent_red)]);
        let font = import_sheet(sheet, &['A']);

        let glyph = &font.glyphs[0];
        assert_eq!(glyph.buffer.read(Some(glyph.region)).get(0, 0), translucent_red);
    }

    #[test]
    fn glyphs_share_one_sheet() {
        let sheet = sheet_with_cells(
            5,
            3,
            &[
                (Region::new(1, 1, 1, 1), Argb::WHITE),
                (Region::new(3, 1, 1, 1), Argb::WHITE),
            ],
        );
        let font = import_sheet(sheet, &['a', 'b']);
        assert!(Rc::ptr_eq(&font.glyphs[0].buffer, &font.glyphs[1].buffer));
    }
}
