//! Writes a packed font as JSON metadata plus a PNG atlas next to it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{GrayAlphaImage, LumaA, Rgba, RgbaImage};
use serde::Serialize;

use crate::config::TextureFormat;
use crate::glyph_packer::PackedGlyph;
use crate::pixel_buffer::PixelBuffer;

pub const METADATA_VERSION: u32 = 1;

/// Everything the writer receives from the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct FontOutput<'a> {
    pub atlas: &'a PixelBuffer,
    pub glyphs: &'a [PackedGlyph],
    pub line_spacing: f32,
    pub default_character: Option<char>,
    /// Already resolved; never [`TextureFormat::Auto`].
    pub texture_format: TextureFormat,
    pub premultiplied: bool,
}

pub trait FontWriter {
    fn write(&self, font: &FontOutput<'_>, output: &Path) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct FontMetadata<'a> {
    version: u32,
    texture: String,
    texture_width: u32,
    texture_height: u32,
    texture_format: &'static str,
    premultiplied: bool,
    line_spacing: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_character: Option<char>,
    glyphs: &'a [PackedGlyph],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AtlasWriter;

impl FontWriter for AtlasWriter {
    fn write(&self, font: &FontOutput<'_>, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let texture_path = texture_path_for(output);
        save_texture(font.atlas, font.texture_format, &texture_path)?;

        let metadata = FontMetadata {
            version: METADATA_VERSION,
            texture: texture_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            texture_width: font.atlas.width(),
            texture_height: font.atlas.height(),
            texture_format: font.texture_format.as_str(),
            premultiplied: font.premultiplied,
            line_spacing: font.line_spacing,
            default_character: font.default_character,
            glyphs: font.glyphs,
        };
        let json = serde_json::to_string_pretty(&metadata)
            .context("failed to serialize font metadata")?;
        fs::write(output, json).with_context(|| format!("failed to write {}", output.display()))
    }
}

/// `font.json` -> `font.png`; an output that is itself a PNG gets
/// `<stem>.atlas.png` instead.
pub fn texture_path_for(output: &Path) -> PathBuf {
    let texture = output.with_extension("png");
    if texture == output {
        output.with_extension("atlas.png")
    } else {
        texture
    }
}

pub fn save_texture(atlas: &PixelBuffer, format: TextureFormat, path: &Path) -> Result<()> {
    let saved = match format {
        TextureFormat::Auto | TextureFormat::Rgba32 => atlas.to_rgba_image().save(path),
        TextureFormat::Bgra4444 => quantize_4444(atlas).save(path),
        TextureFormat::CompressedMono => mono_image(atlas).save(path),
    };
    saved.with_context(|| format!("failed to write {}", path.display()))
}

fn quantize_4444(atlas: &PixelBuffer) -> RgbaImage {
    let mut image = atlas.to_rgba_image();
    for pixel in image.pixels_mut() {
        let Rgba(channels) = *pixel;
        *pixel = Rgba(channels.map(|value| (value >> 4) * 17));
    }
    image
}

/// Mono fonts are white wherever visible, so one color channel carries all
/// the information.
fn mono_image(atlas: &PixelBuffer) -> GrayAlphaImage {
    let view = atlas.read(None);
    GrayAlphaImage::from_fn(atlas.width(), atlas.height(), |x, y| {
        let color = view.get(x, y);
        LumaA([color.r(), color.a()])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_buffer::{Argb, Region};
    use serde_json::Value;
    use tempfile::tempdir;

    fn sample_atlas() -> PixelBuffer {
        PixelBuffer::filled(4, 4, Argb::from_argb(0xAB, 0xFF, 0x12, 0x0F))
    }

    fn sample_glyphs() -> Vec<PackedGlyph> {
        vec![PackedGlyph {
            character: 'A',
            region: Region::new(1, 1, 2, 2),
            offset_x: 1.0,
            offset_y: 0.0,
            advance_x: 0.5,
        }]
    }

    #[test]
    fn texture_path_sits_next_to_metadata() {
        assert_eq!(texture_path_for(Path::new("out/font.json")), PathBuf::from("out/font.png"));
        assert_eq!(texture_path_for(Path::new("font")), PathBuf::from("font.png"));
        assert_eq!(
            texture_path_for(Path::new("font.png")),
            PathBuf::from("font.atlas.png")
        );
    }

    #[test]
    fn writes_metadata_and_texture() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("nested/font.json");
        let atlas = sample_atlas();
        let glyphs = sample_glyphs();
        let font = FontOutput {
            atlas: &atlas,
            glyphs: &glyphs,
            line_spacing: 12.0,
            default_character: Some('?'),
            texture_format: TextureFormat::Rgba32,
            premultiplied: false,
        };

        AtlasWriter.write(&font, &output).expect("write should succeed");

        let metadata: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(metadata["texture"], "font.png");
        assert_eq!(metadata["texture_format"], "rgba32");
        assert_eq!(metadata["line_spacing"], 12.0);
        assert_eq!(metadata["default_character"], "?");
        assert_eq!(metadata["glyphs"][0]["character"], "A");
        assert_eq!(metadata["glyphs"][0]["x"], 1);
        assert_eq!(metadata["glyphs"][0]["advance_x"], 0.5);

        let texture = image::open(dir.path().join("nested/font.png")).unwrap().to_rgba8();
        assert_eq!(texture.get_pixel(0, 0), &Rgba([0xFF, 0x12, 0x0F, 0xAB]));
    }

    #[test]
    fn bgra4444_quantizes_every_channel() {
        let image = quantize_4444(&sample_atlas());
        assert_eq!(image.get_pixel(3, 3), &Rgba([0xFF, 0x11, 0x00, 0xAA]));
    }

    #[test]
    fn mono_texture_keeps_color_and_alpha() {
        let atlas = PixelBuffer::filled(2, 2, Argb::from_argb(90, 90, 90, 90));
        let image = mono_image(&atlas);
        assert_eq!(image.get_pixel(1, 0), &LumaA([90, 90]));
    }
}
