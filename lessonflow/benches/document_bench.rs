//! Benchmarks for result edits and document export.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use lessonflow::export::{build_document, DocumentExporter, DocxExporter, ExportBundle};
use lessonflow::overlay::{apply_edit, FieldPath};
use lessonflow::testing::fixtures;

fn bundle() -> ExportBundle {
    ExportBundle::new(
        fixtures::zakat_lesson(),
        Arc::new(fixtures::sample_objectives()),
        Arc::new(fixtures::sample_scenario()),
        Arc::new(fixtures::sample_assessment()),
    )
}

fn overlay_benchmark(c: &mut Criterion) {
    let assessment = fixtures::sample_assessment();
    let path: FieldPath = "asesmen_formatif.rubrik.0.skor_4"
        .parse()
        .unwrap_or_else(|_| FieldPath::root());

    c.bench_function("apply_edit_assessment", |b| {
        b.iter(|| apply_edit(black_box(&assessment), black_box(&path), "Sangat baik"))
    });
}

fn export_benchmark(c: &mut Criterion) {
    let bundle = bundle();

    c.bench_function("build_document", |b| b.iter(|| build_document(black_box(&bundle))));
    c.bench_function("docx_export", |b| {
        let exporter = DocxExporter::new();
        b.iter(|| exporter.export(black_box(&bundle)))
    });
}

criterion_group!(benches, overlay_benchmark, export_benchmark);
criterion_main!(benches);
