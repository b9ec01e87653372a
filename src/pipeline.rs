//! Import → sort → validate → crop → pack → adjust → resolve format →
//! premultiply → write.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;

use crate::bitmap_ops::{matches_rgb, premultiply_alpha};
use crate::config::{FeatureLevel, FontOptions, TextureFormat};
use crate::cropper::crop;
use crate::error_codes::CodedError;
use crate::glyph_packer::{arrange_glyphs, arrange_glyphs_fast};
use crate::importer::{importer_for, ImportedFont};
use crate::pixel_buffer::{Argb, PixelBuffer};
use crate::writer::{AtlasWriter, FontOutput, FontWriter};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildSummary {
    pub glyph_count: usize,
    pub line_spacing: f32,
    pub texture_width: u32,
    pub texture_height: u32,
    pub texture_format: &'static str,
}

pub fn build_sprite_font(options: &FontOptions) -> Result<BuildSummary> {
    build_sprite_font_with(options, &AtlasWriter)
}

pub fn build_sprite_font_with(
    options: &FontOptions,
    writer: &dyn FontWriter,
) -> Result<BuildSummary> {
    options.validate()?;

    info!("Importing {}", options.source_font.display());
    let ImportedFont {
        mut glyphs,
        line_spacing,
    } = import_font(options)?;
    info!("Imported {} glyphs", glyphs.len());

    info!("Cropping glyph borders");
    for glyph in &mut glyphs {
        crop(glyph);
        debug!(
            "U+{:04X} cropped to {:?} offset ({}, {}) advance {}",
            glyph.character as u32,
            glyph.region,
            glyph.offset_x,
            glyph.offset_y,
            glyph.advance_x
        );
    }

    info!("Packing glyphs into sprite sheet");
    let mut packed = if options.fast_pack {
        arrange_glyphs_fast(glyphs)
    } else {
        arrange_glyphs(glyphs)
    };

    if let Some(warning) = texture_size_warning(&packed.atlas, options.feature_level) {
        warn!("{}", warning);
    }

    let line_spacing = line_spacing + options.line_spacing;
    for glyph in &mut packed.glyphs {
        glyph.advance_x += options.character_spacing;
    }

    let texture_format = resolve_texture_format(options.texture_format, &packed.atlas);

    let premultiplied = !options.no_premultiply;
    if premultiplied {
        info!("Premultiplying alpha");
        premultiply_alpha(&mut packed.atlas);
    }

    if let Some(debug_path) = &options.debug_output_sprite_sheet {
        info!("Saving debug output spritesheet {}", debug_path.display());
        packed
            .atlas
            .to_rgba_image()
            .save(debug_path)
            .with_context(|| format!("failed to write {}", debug_path.display()))?;
    }

    info!(
        "Writing {} ({} format)",
        options.output_file.display(),
        texture_format.as_str()
    );
    let output = FontOutput {
        atlas: &packed.atlas,
        glyphs: &packed.glyphs,
        line_spacing,
        default_character: options.default_character()?,
        texture_format,
        premultiplied,
    };
    writer.write(&output, &options.output_file)?;

    Ok(BuildSummary {
        glyph_count: packed.glyphs.len(),
        line_spacing,
        texture_width: packed.atlas.width(),
        texture_height: packed.atlas.height(),
        texture_format: texture_format.as_str(),
    })
}

/// Imports glyphs, orders them by character and checks the result is usable.
pub fn import_font(options: &FontOptions) -> Result<ImportedFont> {
    let importer = importer_for(&options.source_font);
    let mut font = importer.import(&options.import_options())?;
    font.glyphs.sort_by_key(|glyph| glyph.character);

    if font.glyphs.is_empty() {
        return Err(CodedError::validation("Font does not contain any glyphs.").into());
    }
    if let Some(default_character) = options.default_character()? {
        if !font
            .glyphs
            .iter()
            .any(|glyph| glyph.character == default_character)
        {
            return Err(CodedError::validation(format!(
                "The specified default character U+{:04X} is not part of this font.",
                default_character as u32
            ))
            .into());
        }
    }

    Ok(font)
}

/// `Auto` becomes `CompressedMono` when every visible atlas pixel is white.
pub fn resolve_texture_format(requested: TextureFormat, atlas: &PixelBuffer) -> TextureFormat {
    match requested {
        TextureFormat::Auto if matches_rgb(Argb::WHITE, atlas) => TextureFormat::CompressedMono,
        TextureFormat::Auto => TextureFormat::Rgba32,
        explicit => explicit,
    }
}

pub fn texture_size_warning(atlas: &PixelBuffer, level: FeatureLevel) -> Option<&'static str> {
    let largest = atlas.width().max(atlas.height());
    if largest > 16384 {
        Some("Resulting texture is too large for all known feature levels (9.1 - 12.1)")
    } else if largest > 8192 {
        (level < FeatureLevel::Fl11_0)
            .then_some("Resulting texture requires a Feature Level 11.0 or later device.")
    } else if largest > 4096 {
        (level < FeatureLevel::Fl10_0)
            .then_some("Resulting texture requires a Feature Level 10.0 or later device.")
    } else if largest > 2048 {
        (level < FeatureLevel::Fl9_3)
            .then_some("Resulting texture requires a Feature Level 9.3 or later device.")
    } else {
        None
    }
}
