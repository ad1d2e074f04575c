use criterion::{Criterion, black_box, criterion_group, criterion_main};
use qrscan::utils::grayscale::{rgb_to_grayscale, yuyv_to_grayscale};

fn bench_rgb_to_grayscale(c: &mut Criterion) {
    for (width, height) in [(100, 100), (640, 480), (1920, 1080)] {
        let image = vec![128u8; width * height * 3];
        c.bench_function(&format!("rgb_to_grayscale_{width}x{height}"), |b| {
            b.iter(|| rgb_to_grayscale(black_box(&image), black_box(width), black_box(height)))
        });
    }
}

fn bench_yuyv_to_grayscale(c: &mut Criterion) {
    let (width, height) = (640, 480);
    let frame = vec![128u8; width * height * 2];
    c.bench_function("yuyv_to_grayscale_640x480", |b| {
        b.iter(|| {
            yuyv_to_grayscale(
                black_box(&frame),
                black_box(width),
                black_box(height),
                black_box(width * 2),
            )
        })
    });
}

criterion_group!(benches, bench_rgb_to_grayscale, bench_yuyv_to_grayscale);
criterion_main!(benches);
