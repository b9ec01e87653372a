//! Font importers. A glyph sheet and a TrueType font both end up as a list of
//! glyphs plus the line spacing of the font.

mod bitmap;
mod truetype;

use std::path::Path;

use anyhow::Result;

use crate::config::ImportOptions;
use crate::glyph::Glyph;

pub use bitmap::{import_sheet, BitmapImporter};
pub use truetype::TrueTypeImporter;

/// Extensions handled by [`BitmapImporter`]; anything else is read as TrueType.
pub const BITMAP_EXTENSIONS: [&str; 3] = ["bmp", "png", "gif"];

#[derive(Debug, Clone)]
pub struct ImportedFont {
    /// Glyphs in import order, not yet cropped.
    pub glyphs: Vec<Glyph>,
    /// Distance between baselines, before user adjustment.
    pub line_spacing: f32,
}

pub trait FontImporter {
    fn import(&self, options: &ImportOptions) -> Result<ImportedFont>;
}

pub fn importer_for(source: &Path) -> Box<dyn FontImporter> {
    if is_bitmap_source(source) {
        Box::new(BitmapImporter)
    } else {
        Box::new(TrueTypeImporter)
    }
}

pub fn is_bitmap_source(source: &Path) -> bool {
    source
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase())
        .is_some_and(|extension| BITMAP_EXTENSIONS.contains(&extension.as_str()))
}
