use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use css_sprite_core::prelude::*;
use image::{DynamicImage, RgbaImage};

fn generate_images(count: usize, min_size: u32, max_size: u32) -> Vec<ImageDescriptor> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let inputs = (0..count)
        .map(|i| {
            let w = rng.gen_range(min_size..=max_size);
            let h = rng.gen_range(min_size..=max_size);
            InputImage {
                key: format!("icon_{}.png", i),
                image: DynamicImage::ImageRgba8(RgbaImage::new(w, h)),
            }
        })
        .collect();
    css_sprite_core::descriptors_from_images(inputs, &SpriteConfig::default())
        .expect("descriptors")
}

fn bench_layout_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_strategies");

    for count in [50, 200, 1000] {
        let descriptors = generate_images(count, 8, 64);
        group.throughput(Throughput::Elements(count as u64));

        let strip = SpriteConfig::default();
        group.bench_with_input(BenchmarkId::new("Strip", count), &descriptors, |b, d| {
            b.iter(|| black_box(pack_layout(d, &strip).expect("layout")));
        });

        let shelf = SpriteConfig::builder()
            .layout(LayoutStrategy::Shelf)
            .max_row_width(1024)
            .build();
        group.bench_with_input(BenchmarkId::new("Shelf", count), &descriptors, |b, d| {
            b.iter(|| black_box(pack_layout(d, &shelf).expect("layout")));
        });
    }

    group.finish();
}

fn bench_full_sheet(c: &mut Criterion) {
    let descriptors = generate_images(200, 8, 64);
    let cfg = SpriteConfig::builder()
        .layout(LayoutStrategy::Shelf)
        .max_row_width(1024)
        .build();
    c.bench_function("build_sprite_sheet_200", |b| {
        b.iter(|| black_box(build_sprite_sheet(&descriptors, &cfg, "sheet.png").expect("sheet")));
    });
}

criterion_group!(benches, bench_layout_strategies, bench_full_sheet);
criterion_main!(benches);
