//! Whole-buffer and per-region pixel transforms used by the import, pack and
//! output stages.

use crate::pixel_buffer::{Argb, LockMode, PixelBuffer, Region};

/// True when every pixel in `region` (whole buffer when `None`) has alpha
/// `expected`.
pub fn matches_alpha(expected: u8, buffer: &PixelBuffer, region: Option<Region>) -> bool {
    buffer.read(region).all(|color| color.a() == expected)
}

/// True when every pixel with non-zero alpha has the RGB of `expected`.
pub fn matches_rgb(expected: Argb, buffer: &PixelBuffer) -> bool {
    buffer
        .read(None)
        .all(|color| color.a() == 0 || color.rgb_eq(expected))
}

/// Turns grey-level art into white with matching translucency:
/// alpha = floor((r + g + b) / 3).
pub fn grey_to_alpha(buffer: &mut PixelBuffer) {
    buffer.lock(LockMode::ReadWrite, None).map_in_place(|color| {
        let brightness = (color.r() as u32 + color.g() as u32 + color.b() as u32) / 3;
        Argb::from_argb(brightness as u8, 255, 255, 255)
    });
}

/// Scales each color channel by alpha, truncating: c = floor(c * a / 255).
pub fn premultiply_alpha(buffer: &mut PixelBuffer) {
    buffer
        .lock(LockMode::ReadWrite, None)
        .map_in_place(premultiply_pixel);
}

pub fn premultiply_pixel(color: Argb) -> Argb {
    let a = color.a() as u32;
    let scale = |channel: u8| (channel as u32 * a / 255) as u8;
    Argb::from_argb(color.a(), scale(color.r()), scale(color.g()), scale(color.b()))
}

/// Copies `source_region` of `source` into `dest_region` of `dest`. Both
/// regions must be the same size.
pub fn copy_region(
    source: &PixelBuffer,
    source_region: Region,
    dest: &mut PixelBuffer,
    dest_region: Region,
) {
    assert_eq!(
        (source_region.width, source_region.height),
        (dest_region.width, dest_region.height),
        "copy regions differ in size"
    );

    let from = source.read(Some(source_region));
    let mut to = dest.lock(LockMode::WriteOnly, Some(dest_region));
    for y in 0..source_region.height {
        for x in 0..source_region.width {
            to.set(x, y, from.get(x, y));
        }
    }
}

/// Bleeds the edge colors of `region` one pixel outward with zero alpha, so a
/// filtering sampler blends visible edges against matching color instead of
/// whatever sits in the padding. Corners take their diagonal neighbour.
///
/// `region` must have a one pixel margin inside the buffer.
pub fn pad_border_pixels(buffer: &mut PixelBuffer, region: Region) {
    assert!(
        region.x >= 1
            && region.y >= 1
            && region.right() < buffer.width()
            && region.bottom() < buffer.height(),
        "region {:?} has no one pixel margin in {}x{} buffer",
        region,
        buffer.width(),
        buffer.height()
    );

    let mut view = buffer.lock(LockMode::ReadWrite, None);
    let (left, top) = (region.x, region.y);
    let (right, bottom) = (region.right() - 1, region.bottom() - 1);
    let mut bleed = |from: (u32, u32), to: (u32, u32)| {
        let color = view.get(from.0, from.1);
        view.set(to.0, to.1, color.with_alpha(0));
    };

    for x in left..=right {
        bleed((x, top), (x, top - 1));
        bleed((x, bottom), (x, bottom + 1));
    }
    for y in top..=bottom {
        bleed((left, y), (left - 1, y));
        bleed((right, y), (right + 1, y));
    }

    bleed((left, top), (left - 1, top - 1));
    bleed((right, top), (right + 1, top - 1));
    bleed((left, bottom), (left - 1, bottom + 1));
    bleed((right, bottom), (right + 1, bottom + 1));
}
