use crate::bitmap_ops::matches_alpha;
use crate::glyph::Glyph;
use crate::pixel_buffer::Region;

/// Trims fully transparent rows and columns from the edges of a glyph. Neither
/// dimension goes below one pixel. Trimming the top or left moves the glyph
/// (offsets grow); trimming the right only shortens the pen advance.
pub fn crop(glyph: &mut Glyph) {
    let buffer = glyph.buffer.clone();
    let transparent = |region: Region| matches_alpha(0, &buffer, Some(region));
    let region = &mut glyph.region;

    while region.height > 1 && transparent(Region::new(region.x, region.y, region.width, 1)) {
        region.y += 1;
        region.height -= 1;
        glyph.offset_y += 1.0;
    }

    while region.height > 1
        && transparent(Region::new(region.x, region.bottom() - 1, region.width, 1))
    {
        region.height -= 1;
    }

    while region.width > 1 && transparent(Region::new(region.x, region.y, 1, region.height)) {
        region.x += 1;
        region.width -= 1;
        glyph.offset_x += 1.0;
    }

    while region.width > 1
        && transparent(Region::new(region.right() - 1, region.y, 1, region.height))
    {
        region.width -= 1;
        glyph.advance_x += 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_buffer::{Argb, LockMode, PixelBuffer};
    use std::rc::Rc;

    fn glyph_with_ink(width: u32, height: u32, ink: &[(u32, u32)]) -> Glyph {
        let mut buffer = PixelBuffer::new(width, height);
        {
            let mut view = buffer.lock(LockMode::WriteOnly, None);
            for &(x, y) in ink {
                view.set(x, y, Argb::WHITE);
            }
        }
        Glyph::whole('g', buffer)
    }

    fn layout(glyph: &Glyph) -> (Region, f32, f32, f32) {
        (glyph.region, glyph.offset_x, glyph.offset_y, glyph.advance_x)
    }

    #[test]
    fn trims_each_edge_and_records_layout() {
        let mut glyph = glyph_with_ink(7, 6, &[(2, 1), (4, 3)]);
        crop(&mut glyph);
        assert_eq!(layout(&glyph), (Region::new(2, 1, 3, 3), 2.0, 1.0, 2.0));
    }

    #[test]
    fn opaque_glyph_is_unchanged() {
        let mut glyph = Glyph::whole('o', PixelBuffer::filled(4, 3, Argb::WHITE));
        let before = layout(&glyph);
        crop(&mut glyph);
        assert_eq!(layout(&glyph), before);
    }

    #[test]
    fn transparent_glyph_stops_at_one_pixel() {
        let mut single = Glyph::whole(' ', PixelBuffer::new(1, 1));
        crop(&mut single);
        assert_eq!(layout(&single), (Region::new(0, 0, 1, 1), 0.0, 0.0, 0.0));

        let mut wide = Glyph::whole(' ', PixelBuffer::new(5, 4));
        crop(&mut wide);
        // Top trims down to the last row, then left trims to the last column.
        assert_eq!(layout(&wide), (Region::new(4, 3, 1, 1), 4.0, 3.0, 0.0));
    }

    #[test]
    fn crop_is_idempotent() {
        let mut glyph = glyph_with_ink(9, 9, &[(3, 2), (6, 7), (4, 4)]);
        crop(&mut glyph);
        let once = layout(&glyph);
        crop(&mut glyph);
        assert_eq!(layout(&glyph), once);
    }

    #[test]
    fn crop_stays_inside_a_shared_sheet_region() {
        // Ink outside the glyph region must not stop trimming.
        let mut buffer = PixelBuffer::filled(6, 6, Argb::WHITE);
        buffer
            .lock(LockMode::ReadWrite, Some(Region::new(1, 1, 4, 4)))
            .map_in_place(|_| Argb::TRANSPARENT);
        buffer
            .lock(LockMode::WriteOnly, Some(Region::new(3, 2, 1, 1)))
            .set(0, 0, Argb::WHITE);
        let mut glyph = Glyph::new('s', Rc::new(buffer), Region::new(1, 1, 4, 4));

        crop(&mut glyph);

        assert_eq!(layout(&glyph), (Region::new(3, 2, 1, 1), 2.0, 1.0, 1.0));
    }
}
