use criterion::{Criterion, black_box, criterion_group, criterion_main};
use qrscan::utils::binarization::{global_histogram_binarize, hybrid_binarize};

/// Diagonal gradient with a light/dark module pattern on top
fn textured(width: usize, height: usize) -> Vec<u8> {
    let mut gray = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let base = ((x + y) * 96 / (width + height)) as u8 + 40;
            let dark = ((x / 6) + (y / 6)) % 2 == 0;
            gray.push(if dark { base } else { base.saturating_add(100) });
        }
    }
    gray
}

fn bench_sizes(c: &mut Criterion) {
    for (width, height) in [(100, 100), (640, 480), (1920, 1080)] {
        let gray = textured(width, height);
        c.bench_function(&format!("global_binarize_{width}x{height}"), |b| {
            b.iter(|| {
                global_histogram_binarize(black_box(&gray), black_box(width), black_box(height))
            })
        });
        c.bench_function(&format!("hybrid_binarize_{width}x{height}"), |b| {
            b.iter(|| hybrid_binarize(black_box(&gray), black_box(width), black_box(height)))
        });
    }
}

criterion_group!(benches, bench_sizes);
criterion_main!(benches);
