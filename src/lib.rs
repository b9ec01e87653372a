//! Turns a marker-delimited glyph sheet or a TrueType font into a packed
//! sprite-font atlas plus layout metadata.

pub mod bitmap_ops;
pub mod character_region;
pub mod config;
pub mod cropper;
pub mod error_codes;
pub mod glyph;
pub mod glyph_packer;
pub mod importer;
pub mod marker_scan;
pub mod pipeline;
pub mod pixel_buffer;
pub mod writer;
