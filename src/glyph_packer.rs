//! Arranges cropped glyphs into a single atlas texture.
//!
//! Every glyph gets a one pixel border that is filled by
//! [`pad_border_pixels`], so bilinear sampling at a glyph edge never picks up
//! a neighbour's color.

use serde::Serialize;

use crate::bitmap_ops::{copy_region, pad_border_pixels};
use crate::glyph::Glyph;
use crate::pixel_buffer::{PixelBuffer, Region};

/// A glyph after packing; `region` is in atlas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackedGlyph {
    pub character: char,
    #[serde(flatten)]
    pub region: Region,
    pub offset_x: f32,
    pub offset_y: f32,
    pub advance_x: f32,
}

#[derive(Debug, Clone)]
pub struct PackedFont {
    pub atlas: PixelBuffer,
    /// Same order as the glyphs handed to the packer.
    pub glyphs: Vec<PackedGlyph>,
}

/// Bounding box of one glyph including its border.
#[derive(Debug, Clone, Copy)]
struct Slot {
    glyph: usize,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl Slot {
    fn overlaps(&self, x: u32, y: u32, width: u32, height: u32) -> bool {
        self.x < x + width
            && x < self.x + self.width
            && self.y < y + height
            && y < self.y + self.height
    }
}

/// Tight packing: largest glyphs first, each at the first free spot found
/// scanning left to right, top to bottom. Slow for big fonts.
pub fn arrange_glyphs(glyphs: Vec<Glyph>) -> PackedFont {
    let mut slots = slots_for(&glyphs);
    slots.sort_by(|a, b| {
        let size = |slot: &Slot| slot.height as u64 * 1024 + slot.width as u64;
        size(b)
            .cmp(&size(a))
            .then_with(|| glyphs[a.glyph].character.cmp(&glyphs[b.glyph].character))
    });

    let width = guess_output_width(&glyphs);
    let mut height = 0;
    for index in 0..slots.len() {
        position_slot(&mut slots, index, width);
        height = height.max(slots[index].y + slots[index].height);
    }

    copy_glyphs_to_atlas(glyphs, &slots, width, height)
}

/// Shelf packing in the given glyph order.
pub fn arrange_glyphs_fast(glyphs: Vec<Glyph>) -> PackedFont {
    let mut slots = slots_for(&glyphs);
    let width = guess_output_width(&glyphs);

    let (mut x, mut y, mut shelf_height, mut height) = (0, 0, 0, 0);
    for slot in &mut slots {
        if x + slot.width > width {
            x = 0;
            y += shelf_height;
            shelf_height = 0;
        }
        slot.x = x;
        slot.y = y;
        x += slot.width;
        shelf_height = shelf_height.max(slot.height);
        height = height.max(y + slot.height);
    }

    copy_glyphs_to_atlas(glyphs, &slots, width, height)
}

fn slots_for(glyphs: &[Glyph]) -> Vec<Slot> {
    glyphs
        .iter()
        .enumerate()
        .map(|(index, glyph)| Slot {
            glyph: index,
            x: 0,
            y: 0,
            width: glyph.region.width + 2,
            height: glyph.region.height + 2,
        })
        .collect()
}

fn position_slot(slots: &mut [Slot], index: usize, output_width: u32) {
    let Slot { width, height, .. } = slots[index];
    let (mut x, mut y) = (0, 0);

    loop {
        let blocker = slots[..index]
            .iter()
            .find(|placed| placed.overlaps(x, y, width, height))
            .copied();

        match blocker {
            None => {
                slots[index].x = x;
                slots[index].y = y;
                return;
            }
            Some(placed) => {
                x = placed.x + placed.width;
                if x + width > output_width {
                    x = 0;
                    y += 1;
                }
            }
        }
    }
}

/// Power-of-two width near the square root of the total glyph area, and
/// never narrower than the widest bordered glyph.
fn guess_output_width(glyphs: &[Glyph]) -> u32 {
    let widest = glyphs.iter().map(|glyph| glyph.region.width + 2).max().unwrap_or(0);
    let total_area: u64 = glyphs.iter().map(|glyph| glyph.region.area()).sum();
    let width = ((total_area as f64).sqrt() as u32).max(widest);
    valid_texture_size(width, true)
}

fn valid_texture_size(value: u32, power_of_two: bool) -> u32 {
    if power_of_two {
        value.max(16).next_power_of_two()
    } else {
        (value + 3) & !3
    }
}

fn copy_glyphs_to_atlas(
    glyphs: Vec<Glyph>,
    slots: &[Slot],
    width: u32,
    height: u32,
) -> PackedFont {
    let mut atlas = PixelBuffer::new(width, valid_texture_size(height, false));
    let mut placed = vec![None; glyphs.len()];

    for slot in slots {
        let glyph = &glyphs[slot.glyph];
        let dest = Region::new(slot.x + 1, slot.y + 1, glyph.region.width, glyph.region.height);
        copy_region(&glyph.buffer, glyph.region, &mut atlas, dest);
        pad_border_pixels(&mut atlas, dest);
        placed[slot.glyph] = Some(dest);
    }

    let glyphs = glyphs
        .into_iter()
        .zip(placed)
        .filter_map(|(glyph, region)| {
            region.map(|region| PackedGlyph {
                character: glyph.character,
                region,
                offset_x: glyph.offset_x,
                offset_y: glyph.offset_y,
                advance_x: glyph.advance_x,
            })
        })
        .collect();

    PackedFont { atlas, glyphs }
}
