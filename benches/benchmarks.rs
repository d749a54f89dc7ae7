use std::io::{Cursor, Write};
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use plugforge::archive::ArchiveLoader;
use plugforge::config::{ScaffoldSettings, UserInput};
use plugforge::engine::ScaffoldEngine;
use plugforge::render::ContentProcessor;
use plugforge::resolve::TokenSet;

const SOURCE: &str = "#include \"[-name-]Processor.h\"\n\
namespace [-company-] {\n\
// [-name-] by [-company-], [-year-]\n\
static const FUID kProcessor ([-processor_uuid-]);\n\
}\n";

fn template_zip(files: usize) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for i in 0..files {
        zip.start_file(
            format!("blank-plugin/source/__Plugin__{i}.cpp"),
            SimpleFileOptions::default(),
        )
        .unwrap();
        for _ in 0..20 {
            zip.write_all(SOURCE.as_bytes()).unwrap();
        }
    }
    zip.finish().unwrap().into_inner()
}

fn sample_input() -> UserInput {
    UserInput::new()
        .with("name", "BenchSynth")
        .with("company", "Acme")
        .with("namespace", "Acme::Bench")
}

fn bench_content_substitution(c: &mut Criterion) {
    let tokens: TokenSet = [
        ("name", "BenchSynth"),
        ("company", "Acme"),
        ("year", "2024"),
        ("processor_uuid", "0x01234567, 0x89ABCDEF, 0x01234567, 0x89ABCDEF"),
    ]
    .into_iter()
    .collect();
    let processor = ContentProcessor::new(&tokens);
    let text = SOURCE.repeat(50);

    c.bench_function("process_text", |b| {
        b.iter(|| black_box(processor.process_text(black_box(&text))));
    });
}

fn bench_archive_load(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let loader = ArchiveLoader::new(&ScaffoldSettings::default()).unwrap();
    let bytes: Arc<[u8]> = template_zip(64).into();

    c.bench_function("load (64 entries)", |b| {
        b.iter(|| {
            let tree = rt.block_on(loader.load(Arc::clone(&bytes))).unwrap();
            black_box(tree)
        });
    });
}

fn bench_full_generation(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let settings = ScaffoldSettings::default();
    let loader = ArchiveLoader::new(&settings).unwrap();
    let template = Arc::new(rt.block_on(loader.load(template_zip(64))).unwrap());
    let engine = ScaffoldEngine::with_os_random(&settings).with_year(2024);
    let input = sample_input();

    c.bench_function("generate (resolve + substitute + encode)", |b| {
        b.iter(|| {
            let artifact = rt
                .block_on(engine.generate(Arc::clone(&template), black_box(&input)))
                .unwrap();
            black_box(artifact)
        });
    });
}

criterion_group!(
    benches,
    bench_content_substitution,
    bench_archive_load,
    bench_full_generation
);
criterion_main!(benches);
