//! Reader and Validation Benchmarks
//!
//! Benchmarks for spec compilation and validation throughput.
//!
//! Run with: `cargo bench --bench reader_ops`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pagespec::{JsonElement, JsonPage, Locator, PageSpecReader, Rect, Validator};

fn spec_text(items: usize) -> String {
    let mut text = String::from("===\nheader id header\nmenu-item-* css #menu li\n===\n");
    text.push_str("@ Layout | desktop, mobile\n");
    text.push_str("header\n    height: 100px\n    inside: screen 0px top left\n");
    text.push_str(&format!("[1 to {items}]\n"));
    text.push_str("menu-item-@\n    height: 30px\n    below: header 0 to 20px\n    text trim is: Item @\n");
    text
}

fn page(items: usize) -> JsonPage {
    (1..=items).fold(
        JsonPage::new()
            .with_screen(Rect::new(0.0, 0.0, 1280.0, 800.0))
            .with_element(JsonElement::new(
                &Locator::id("header"),
                Rect::new(0.0, 0.0, 1280.0, 100.0),
            )),
        |page, i| {
            page.with_element(
                JsonElement::new(
                    &Locator::css("#menu li"),
                    Rect::new(i as f64 * 110.0, 110.0, 100.0, 30.0),
                )
                .with_text(format!(" Item {i} ")),
            )
        },
    )
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for items in [5, 50, 500] {
        let text = spec_text(items);
        let page = page(items);
        let reader = PageSpecReader::new();
        group.bench_with_input(BenchmarkId::from_parameter(items), &text, |bench, text| {
            bench.iter(|| {
                let spec = reader.read_text(black_box(text), "bench.spec", Some(&page));
                black_box(spec)
            });
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for items in [5, 50, 500] {
        let page = page(items);
        let Ok(spec) = PageSpecReader::new().read_text(&spec_text(items), "bench.spec", Some(&page))
        else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(items), &spec, |bench, spec| {
            bench.iter(|| {
                let report = Validator::new(spec, &page).validate(black_box(&["desktop"]));
                black_box(report)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_validate);
criterion_main!(benches);
