use criterion::{Criterion, criterion_group, criterion_main};
use markdown_caret_engine::{Document, MemorySink, MonospaceLayout, Navigator, Selection};

fn generate_markdown(sections: usize) -> String {
    let base = "# Heading\n\nParagraph with `inline code` and ![img](i.png) inside it.\n\n- item one\n  - nested item\n- item two\n\n```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n\n---\n\n";
    base.repeat(sections)
}

fn start_of(doc: &Document) -> MemorySink {
    let run = doc.first_text_run(doc.root()).expect("document has text");
    MemorySink::at(Selection::caret(run, 0))
}

fn bench_navigation(c: &mut Criterion) {
    let mut group = c.benchmark_group("navigation");
    group.sample_size(10);

    let content = generate_markdown(20);
    let doc = Document::from_markdown(&content);

    group.bench_function("parse", |b| {
        b.iter(|| Document::from_markdown(std::hint::black_box(&content)));
    });

    group.bench_function("forward_200", |b| {
        b.iter(|| {
            let mut d = doc.clone();
            let mut nav = Navigator::new(MonospaceLayout::default());
            let mut sink = start_of(&d);
            for _ in 0..200 {
                nav.move_cursor_forward(&mut d, &mut sink, || {});
            }
            std::hint::black_box(sink);
        });
    });

    group.bench_function("down_50", |b| {
        b.iter(|| {
            let mut d = doc.clone();
            let mut nav = Navigator::new(MonospaceLayout::default());
            let mut sink = start_of(&d);
            for _ in 0..50 {
                nav.move_cursor_down(&mut d, &mut sink, || {});
            }
            std::hint::black_box(sink);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_navigation);
criterion_main!(benches);
