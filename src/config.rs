use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::character_region::{self, CharacterRegion};
use crate::error_codes::CodedError;

/// Pixel format of the written texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TextureFormat {
    /// Pick `compressed_mono` for pure white fonts, `rgba32` otherwise.
    #[default]
    Auto,
    Rgba32,
    Bgra4444,
    CompressedMono,
}

impl TextureFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Rgba32 => "rgba32",
            Self::Bgra4444 => "bgra4444",
            Self::CompressedMono => "compressed_mono",
        }
    }
}

/// Lowest Direct3D feature level the font must load on. Only used for
/// texture-size warnings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, ValueEnum,
)]
pub enum FeatureLevel {
    #[default]
    #[serde(rename = "fl9_1")]
    #[value(name = "fl9_1")]
    Fl9_1,
    #[serde(rename = "fl9_2")]
    #[value(name = "fl9_2")]
    Fl9_2,
    #[serde(rename = "fl9_3")]
    #[value(name = "fl9_3")]
    Fl9_3,
    #[serde(rename = "fl10_0")]
    #[value(name = "fl10_0")]
    Fl10_0,
    #[serde(rename = "fl10_1")]
    #[value(name = "fl10_1")]
    Fl10_1,
    #[serde(rename = "fl11_0")]
    #[value(name = "fl11_0")]
    Fl11_0,
    #[serde(rename = "fl11_1")]
    #[value(name = "fl11_1")]
    Fl11_1,
    #[serde(rename = "fl12_0")]
    #[value(name = "fl12_0")]
    Fl12_0,
    #[serde(rename = "fl12_1")]
    #[value(name = "fl12_1")]
    Fl12_1,
}

/// Style synthesized by the TrueType importer. Bitmap sheets ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, Self::Italic | Self::BoldItalic)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontOptions {
    /// TrueType font file, or a marker-delimited glyph sheet (.bmp, .png, .gif).
    pub source_font: PathBuf,
    /// Metadata file to write; the atlas PNG is written next to it.
    pub output_file: PathBuf,
    #[serde(default)]
    pub character_regions: Vec<CharacterRegion>,
    /// Fallback for characters missing from the font. Zero means none.
    #[serde(default)]
    pub default_character: u32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default)]
    pub font_style: FontStyle,
    /// Added to the imported line spacing. Negative pulls lines together.
    #[serde(default)]
    pub line_spacing: f32,
    /// Added to every glyph advance.
    #[serde(default)]
    pub character_spacing: f32,
    /// Hard-edged instead of smooth TrueType coverage.
    #[serde(default)]
    pub sharp: bool,
    #[serde(default)]
    pub texture_format: TextureFormat,
    #[serde(default)]
    pub feature_level: FeatureLevel,
    /// Keep straight alpha instead of premultiplying.
    #[serde(default)]
    pub no_premultiply: bool,
    /// Shelf packing instead of the slower tight packing.
    #[serde(default)]
    pub fast_pack: bool,
    #[serde(default)]
    pub debug_output_sprite_sheet: Option<PathBuf>,
}

pub fn default_font_size() -> f32 {
    23.0
}

impl FontOptions {
    pub fn new(source_font: impl Into<PathBuf>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            source_font: source_font.into(),
            output_file: output_file.into(),
            character_regions: Vec::new(),
            default_character: 0,
            font_size: default_font_size(),
            font_style: FontStyle::default(),
            line_spacing: 0.0,
            character_spacing: 0.0,
            sharp: false,
            texture_format: TextureFormat::default(),
            feature_level: FeatureLevel::default(),
            no_premultiply: false,
            fast_pack: false,
            debug_output_sprite_sheet: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(CodedError::format(format!(
                "font_size must be > 0, got {}",
                self.font_size
            ))
            .into());
        }
        if !self.line_spacing.is_finite() || !self.character_spacing.is_finite() {
            return Err(CodedError::format("spacing adjustments must be finite numbers").into());
        }
        self.default_character()?;
        Ok(())
    }

    /// Configured fallback character, `None` when disabled.
    pub fn default_character(&self) -> Result<Option<char>, CodedError> {
        if self.default_character == 0 {
            return Ok(None);
        }
        char::from_u32(self.default_character)
            .map(Some)
            .ok_or_else(|| {
                CodedError::format(format!(
                    "default character U+{:04X} is not a valid character",
                    self.default_character
                ))
            })
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            source_font: self.source_font.clone(),
            characters: character_region::flatten(&self.character_regions),
            font_size: self.font_size,
            font_style: self.font_style,
            sharp: self.sharp,
        }
    }
}

/// What an importer needs to know.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub source_font: PathBuf,
    /// Requested characters, distinct, in the order glyph cells are assigned.
    pub characters: Vec<char>,
    pub font_size: f32,
    pub font_style: FontStyle,
    pub sharp: bool,
}

impl ImportOptions {
    pub fn new(source_font: impl Into<PathBuf>, characters: Vec<char>) -> Self {
        Self {
            source_font: source_font.into(),
            characters,
            font_size: default_font_size(),
            font_style: FontStyle::default(),
            sharp: false,
        }
    }
}

/// Reads a YAML font manifest. Relative paths resolve against the manifest's
/// directory.
pub fn load_font_manifest(path: &Path) -> Result<FontOptions> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let mut options: FontOptions = serde_yaml::from_str(&contents).map_err(|error| {
        let location = error
            .location()
            .map(|location| format!("line {}, column {}", location.line(), location.column()))
            .unwrap_or_else(|| "unknown location".to_owned());
        anyhow!(CodedError::format(format!(
            "failed to parse yaml in {} at {}: {}",
            path.display(),
            location,
            error
        )))
    })?;

    let manifest_dir = path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    options.source_font = resolve(&manifest_dir, &options.source_font);
    options.output_file = resolve(&manifest_dir, &options.output_file);
    options.debug_output_sprite_sheet = options
        .debug_output_sprite_sheet
        .as_deref()
        .map(|debug_path| resolve(&manifest_dir, debug_path));

    options.validate()?;
    Ok(options)
}

fn resolve(manifest_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        manifest_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_codes::{find_coded_error, CodedErrorKind};
    use tempfile::tempdir;

    #[test]
    fn manifest_defaults_and_relative_paths() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("font.yaml");
        fs::write(
            &manifest,
            "source_font: art/sheet.png\noutput_file: out/font.json\ncharacter_regions: ['A-C', '0x61']\n",
        )
        .unwrap();

        let options = load_font_manifest(&manifest).expect("manifest should load");
        assert_eq!(options.source_font, dir.path().join("art/sheet.png"));
        assert_eq!(options.output_file, dir.path().join("out/font.json"));
        assert_eq!(options.font_size, 23.0);
        assert_eq!(options.texture_format, TextureFormat::Auto);
        assert_eq!(options.feature_level, FeatureLevel::Fl9_1);
        assert_eq!(options.import_options().characters, vec!['A', 'B', 'C', 'a']);
    }

    #[test]
    fn manifest_rejects_unknown_fields_as_format_errors() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("font.yaml");
        fs::write(&manifest, "source_font: a.png\noutput_file: b.json\ncolour: red\n").unwrap();

        let error = load_font_manifest(&manifest).unwrap_err();
        let coded = find_coded_error(&error).expect("coded error");
        assert_eq!(coded.kind, CodedErrorKind::Format);
        assert!(coded.message.contains("colour"), "{}", coded.message);
    }

    #[test]
    fn manifest_rejects_bad_character_region() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("font.yaml");
        fs::write(
            &manifest,
            "source_font: a.png\noutput_file: b.json\ncharacter_regions: ['Z-A']\n",
        )
        .unwrap();

        let error = load_font_manifest(&manifest).unwrap_err();
        assert_eq!(
            find_coded_error(&error).map(|coded| coded.kind),
            Some(CodedErrorKind::Format)
        );
    }

    #[test]
    fn feature_levels_are_ordered() {
        assert!(FeatureLevel::Fl9_1 < FeatureLevel::Fl9_3);
        assert!(FeatureLevel::Fl10_0 < FeatureLevel::Fl11_0);
        let parsed: FeatureLevel = serde_yaml::from_str("fl11_0").unwrap();
        assert_eq!(parsed, FeatureLevel::Fl11_0);
    }

    #[test]
    fn validate_rejects_non_positive_size_and_bad_default() {
        let mut options = FontOptions::new("a.ttf", "a.json");
        options.font_size = 0.0;
        assert!(options.validate().is_err());

        let mut options = FontOptions::new("a.ttf", "a.json");
        options.default_character = 0xD800;
        assert!(options.validate().is_err());

        let mut options = FontOptions::new("a.ttf", "a.json");
        options.default_character = '?' as u32;
        assert_eq!(options.default_character().unwrap(), Some('?'));
    }
}
