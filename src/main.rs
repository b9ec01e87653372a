use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use serde::Serialize;

use spritefont::character_region::CharacterRegion;
use spritefont::config::{
    default_font_size, load_font_manifest, FeatureLevel, FontOptions, FontStyle, TextureFormat,
};
use spritefont::error_codes::error_envelope;
use spritefont::marker_scan::{glyph_regions, is_marker_color};
use spritefont::pipeline::{build_sprite_font, BuildSummary};
use spritefont::pixel_buffer::{PixelBuffer, Region};

#[derive(Debug, Parser)]
#[command(name = "spritefont")]
#[command(about = "Build sprite-font atlases from glyph sheets and TrueType fonts")]
#[command(version = env!("SPRITEFONT_VERSION"))]
struct Cli {
    /// Print results and errors as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build a font from a source file and command-line options.
    Build(BuildArgs),
    /// Build a font described by a YAML manifest.
    Manifest { path: PathBuf },
    /// List the marker-delimited glyph cells of a sheet.
    Scan { image: PathBuf },
}

#[derive(Debug, Args)]
struct BuildArgs {
    source: PathBuf,
    output: PathBuf,
    /// Repeatable: `A`, `A-Z`, `32-127`, `0x20-0x7F`.
    #[arg(long = "character-region")]
    character_regions: Vec<String>,
    /// Codepoint used for characters missing from the font; 0 disables.
    #[arg(long, default_value_t = 0, value_parser = parse_codepoint)]
    default_character: u32,
    #[arg(long, default_value_t = default_font_size())]
    font_size: f32,
    #[arg(long, value_enum, default_value_t = FontStyle::Regular)]
    font_style: FontStyle,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    line_spacing: f32,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    character_spacing: f32,
    #[arg(long)]
    sharp: bool,
    #[arg(long, value_enum, default_value_t = TextureFormat::Auto)]
    texture_format: TextureFormat,
    #[arg(long, value_enum, default_value_t = FeatureLevel::Fl9_1)]
    feature_level: FeatureLevel,
    #[arg(long)]
    no_premultiply: bool,
    #[arg(long)]
    fast_pack: bool,
    #[arg(long)]
    debug_output_sprite_sheet: Option<PathBuf>,
}

impl BuildArgs {
    /// Malformed region text surfaces as a format error.
    fn into_options(self) -> Result<FontOptions> {
        let mut options = FontOptions::new(self.source, self.output);
        options.character_regions = self
            .character_regions
            .iter()
            .map(|region| region.parse::<CharacterRegion>())
            .collect::<Result<_, _>>()?;
        options.default_character = self.default_character;
        options.font_size = self.font_size;
        options.font_style = self.font_style;
        options.line_spacing = self.line_spacing;
        options.character_spacing = self.character_spacing;
        options.sharp = self.sharp;
        options.texture_format = self.texture_format;
        options.feature_level = self.feature_level;
        options.no_premultiply = self.no_premultiply;
        options.fast_pack = self.fast_pack;
        options.debug_output_sprite_sheet = self.debug_output_sprite_sheet;
        Ok(options)
    }
}

fn parse_codepoint(value: &str) -> Result<u32, String> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|error| format!("invalid codepoint '{value}': {error}"))
}

#[derive(Debug, Serialize)]
struct BuildReport {
    ok: bool,
    #[serde(flatten)]
    summary: BuildSummary,
}

#[derive(Debug, Serialize)]
struct ScanReport {
    ok: bool,
    width: u32,
    height: u32,
    regions: Vec<Region>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Build(args) => args
            .into_options()
            .and_then(|options| run_build(&options, cli.json)),
        Commands::Manifest { path } => run_manifest(&path, cli.json),
        Commands::Scan { image } => run_scan(&image, cli.json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let envelope = error_envelope(&error);
            if cli.json {
                match serde_json::to_string_pretty(&envelope) {
                    Ok(json) => println!("{json}"),
                    Err(_) => eprintln!("Error: {}", envelope.error.message),
                }
            } else {
                eprintln!("Error: {}", envelope.error.message);
            }
            ExitCode::FAILURE
        }
    }
}

fn run_manifest(path: &Path, json: bool) -> Result<()> {
    let options = load_font_manifest(path)?;
    run_build(&options, json)
}

fn run_build(options: &FontOptions, json: bool) -> Result<()> {
    let summary = build_sprite_font(options)?;

    if json {
        let report = BuildReport { ok: true, summary };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Wrote {} ({} glyphs, {}x{} {}, line spacing {})",
            options.output_file.display(),
            summary.glyph_count,
            summary.texture_width,
            summary.texture_height,
            summary.texture_format,
            summary.line_spacing
        );
    }
    Ok(())
}

fn run_scan(image: &Path, json: bool) -> Result<()> {
    let sheet = PixelBuffer::open(image)?;
    let regions = glyph_regions(&sheet, is_marker_color);

    if json {
        let report = ScanReport {
            ok: true,
            width: sheet.width(),
            height: sheet.height(),
            regions,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{}: {}x{}, {} cells",
            image.display(),
            sheet.width(),
            sheet.height(),
            regions.len()
        );
        for (index, region) in regions.iter().enumerate() {
            println!(
                "{index:>4}  x={} y={} {}x{}",
                region.x, region.y, region.width, region.height
            );
        }
    }
    Ok(())
}
