//! Hot loops of the glyph pipeline on a synthetic 16x6 cell sheet.
//! Run: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spritefont::bitmap_ops::premultiply_alpha;
use spritefont::cropper::crop;
use spritefont::glyph_packer::arrange_glyphs;
use spritefont::importer::import_sheet;
use spritefont::marker_scan::{glyph_regions, is_marker_color, MARKER_COLOR};
use spritefont::pixel_buffer::{Argb, LockMode, PixelBuffer, Region};

const CELL: u32 = 24;

/// Printable-ASCII-sized sheet: 16 columns by 6 rows of cells, each with a
/// small block of ink off-centre so cropping has work to do.
fn synthetic_sheet() -> PixelBuffer {
    let (columns, rows) = (16, 6);
    let mut sheet = PixelBuffer::filled(
        columns * (CELL + 1) + 1,
        rows * (CELL + 1) + 1,
        MARKER_COLOR,
    );
    for row in 0..rows {
        for column in 0..columns {
            let x = 1 + column * (CELL + 1);
            let y = 1 + row * (CELL + 1);
            sheet
                .lock(LockMode::ReadWrite, Some(Region::new(x, y, CELL, CELL)))
                .map_in_place(|_| Argb::TRANSPARENT);
            sheet
                .lock(LockMode::ReadWrite, Some(Region::new(x + 4, y + 6, 9, 12)))
                .map_in_place(|_| Argb::WHITE.with_alpha(200));
        }
    }
    sheet
}

fn bench_glyph_pipeline(c: &mut Criterion) {
    let sheet = synthetic_sheet();
    let characters = (' '..='~').collect::<Vec<_>>();

    let mut group = c.benchmark_group("glyph_pipeline");
    group.sample_size(50);

    group.bench_function("scan_markers", |b| {
        b.iter(|| black_box(glyph_regions(black_box(&sheet), is_marker_color)))
    });

    group.bench_function("crop_glyphs", |b| {
        b.iter(|| {
            let mut font = import_sheet(sheet.clone(), &characters);
            for glyph in &mut font.glyphs {
                crop(glyph);
            }
            black_box(font)
        })
    });

    let mut font = import_sheet(sheet.clone(), &characters);
    for glyph in &mut font.glyphs {
        crop(glyph);
    }
    let atlas = arrange_glyphs(font.glyphs).atlas;

    group.bench_function("premultiply_atlas", |b| {
        b.iter(|| {
            let mut atlas = atlas.clone();
            premultiply_alpha(&mut atlas);
            black_box(atlas)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_glyph_pipeline);
criterion_main!(benches);
