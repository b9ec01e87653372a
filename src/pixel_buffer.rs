//! Packed 32-bit pixel storage and scoped access to rectangular parts of it.
//!
//! A [`PixelBuffer`] stores `0xAARRGGBB` samples row by row. Rows may be wider
//! than the image (`stride >= width`), so every address goes through the
//! buffer stride rather than the width of whatever region is being touched.
//!
//! Pixels are only reachable through a [`PixelAccessor`]. Read-only accessors
//! borrow the buffer shared and can overlap freely; write-capable accessors
//! borrow it exclusively. The accessor is released when the borrow ends, on
//! every exit path.

use std::path::Path;

use anyhow::Result;
use image::{Rgba, RgbaImage};

use crate::error_codes::CodedError;

/// One packed `0xAARRGGBB` color sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Argb(pub u32);

impl Argb {
    pub const TRANSPARENT: Argb = Argb(0x0000_0000);
    pub const WHITE: Argb = Argb(0xFFFF_FFFF);
    pub const BLACK: Argb = Argb(0xFF00_0000);

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Same color channels with the alpha replaced.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0x00FF_FFFF) | ((a as u32) << 24))
    }

    pub fn rgb_eq(self, other: Argb) -> bool {
        (self.0 & 0x00FF_FFFF) == (other.0 & 0x00FF_FFFF)
    }

    pub fn from_rgba(pixel: Rgba<u8>) -> Self {
        let [r, g, b, a] = pixel.0;
        Self::from_argb(a, r, g, b)
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r(), self.g(), self.b(), self.a()])
    }
}

/// Axis-aligned rectangle in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        (self.x as u64 + self.width as u64) <= width as u64
            && (self.y as u64 + self.height as u64) <= height as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl LockMode {
    fn can_read(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    fn can_write(self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: u32,
    samples: Vec<u32>,
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Argb::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: Argb) -> Self {
        Self::with_stride(width, height, width, color)
    }

    /// Buffer whose rows are `stride` samples apart. Samples past `width` in
    /// each row are padding and never visible through an accessor.
    pub fn with_stride(width: u32, height: u32, stride: u32, color: Argb) -> Self {
        assert!(stride >= width, "stride {stride} is narrower than width {width}");
        Self {
            width,
            height,
            stride,
            samples: vec![color.0; stride as usize * height as usize],
        }
    }

    /// Decodes an image file and normalizes it to packed ARGB.
    pub fn open(path: &Path) -> Result<Self> {
        let decoded = image::open(path).map_err(|error| CodedError::decode(path, error))?;
        Ok(Self::from_rgba_image(&decoded.to_rgba8()))
    }

    pub fn from_rgba_image(image: &RgbaImage) -> Self {
        let samples = image
            .pixels()
            .map(|pixel| Argb::from_rgba(*pixel).0)
            .collect::<Vec<_>>();
        Self {
            width: image.width(),
            height: image.height(),
            stride: image.width(),
            samples,
        }
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        let view = self.read(None);
        RgbaImage::from_fn(self.width, self.height, |x, y| view.get(x, y).to_rgba())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn bounds(&self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }

    /// Read-only accessor over `region` (the whole buffer when `None`).
    pub fn read(&self, region: Option<Region>) -> PixelAccessor<'_> {
        let region = self.checked_region(region);
        PixelAccessor {
            samples: Samples::Shared(&self.samples),
            stride: self.stride as usize,
            region,
            mode: LockMode::ReadOnly,
        }
    }

    /// Accessor with exclusive access to `region` (the whole buffer when `None`).
    pub fn lock(&mut self, mode: LockMode, region: Option<Region>) -> PixelAccessor<'_> {
        let region = self.checked_region(region);
        PixelAccessor {
            samples: Samples::Exclusive(&mut self.samples),
            stride: self.stride as usize,
            region,
            mode,
        }
    }

    fn checked_region(&self, region: Option<Region>) -> Region {
        let region = region.unwrap_or_else(|| self.bounds());
        assert!(
            region.fits_within(self.width, self.height),
            "region {:?} exceeds {}x{} buffer",
            region,
            self.width,
            self.height
        );
        region
    }
}

enum Samples<'a> {
    Shared(&'a [u32]),
    Exclusive(&'a mut [u32]),
}

/// Scoped view over a region of a [`PixelBuffer`]. Coordinates are relative to
/// the region origin.
pub struct PixelAccessor<'a> {
    samples: Samples<'a>,
    stride: usize,
    region: Region,
    mode: LockMode,
}

impl PixelAccessor<'_> {
    pub fn region(&self) -> Region {
        self.region
    }

    pub fn width(&self) -> u32 {
        self.region.width
    }

    pub fn height(&self) -> u32 {
        self.region.height
    }

    pub fn get(&self, x: u32, y: u32) -> Argb {
        assert!(self.mode.can_read(), "pixel read through a {:?} accessor", self.mode);
        let index = self.index(x, y);
        match &self.samples {
            Samples::Shared(samples) => Argb(samples[index]),
            Samples::Exclusive(samples) => Argb(samples[index]),
        }
    }

    pub fn set(&mut self, x: u32, y: u32, color: Argb) {
        assert!(self.mode.can_write(), "pixel write through a {:?} accessor", self.mode);
        let index = self.index(x, y);
        match &mut self.samples {
            Samples::Exclusive(samples) => samples[index] = color.0,
            Samples::Shared(_) => unreachable!("shared accessors are always read-only"),
        }
    }

    /// Applies `f` to every pixel of the region in row-major order.
    pub fn map_in_place(&mut self, mut f: impl FnMut(Argb) -> Argb) {
        for y in 0..self.region.height {
            for x in 0..self.region.width {
                let color = self.get(x, y);
                self.set(x, y, f(color));
            }
        }
    }

    /// True when every pixel of the region satisfies `predicate`.
    pub fn all(&self, mut predicate: impl FnMut(Argb) -> bool) -> bool {
        (0..self.region.height)
            .all(|y| (0..self.region.width).all(|x| predicate(self.get(x, y))))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.region.width && y < self.region.height,
            "pixel ({x}, {y}) outside {}x{} accessor",
            self.region.width,
            self.region.height
        );
        (self.region.y + y) as usize * self.stride + (self.region.x + x) as usize
    }
}
