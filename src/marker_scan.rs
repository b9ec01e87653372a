//! Finds glyph cells in a sheet where cells are separated by a marker color.
//!
//! Each cell is assumed to be a solid rectangle fully surrounded by marker
//! pixels. Cells that break that rule still produce a rectangle, measured
//! from the cell's top-left corner along its first row and first column.

use crate::pixel_buffer::{Argb, PixelBuffer, Region};

/// Bright magenta. Compared on the full packed value, alpha included.
pub const MARKER_COLOR: Argb = Argb(0xFFFF_00FF);

pub fn is_marker_color(color: Argb) -> bool {
    color == MARKER_COLOR
}

/// Regions of every marker-delimited cell, in row-major order of their
/// top-left corners.
pub fn glyph_regions(buffer: &PixelBuffer, is_marker: impl Fn(Argb) -> bool) -> Vec<Region> {
    let view = buffer.read(None);
    let (width, height) = (buffer.width(), buffer.height());
    let mut regions = Vec::new();

    for y in 1..height {
        for x in 1..width {
            // Top-left corner: not marker, with marker directly left and above.
            if is_marker(view.get(x, y))
                || !is_marker(view.get(x - 1, y))
                || !is_marker(view.get(x, y - 1))
            {
                continue;
            }

            let mut cell_width = 1;
            while x + cell_width < width && !is_marker(view.get(x + cell_width, y)) {
                cell_width += 1;
            }

            let mut cell_height = 1;
            while y + cell_height < height && !is_marker(view.get(x, y + cell_height)) {
                cell_height += 1;
            }

            regions.push(Region::new(x, y, cell_width, cell_height));
        }
    }

    regions
}
