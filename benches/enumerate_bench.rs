use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::TempDir;

use segscope::{enumerate, fetch, lookup, Document, IndexSnapshot, IndexWriter};

struct BenchEnv {
    _tmp: TempDir,
    snapshot: IndexSnapshot,
}

/// Build an index of `doc_count` documents, split into `segments` commits,
/// with every tenth document deleted
fn build_env(doc_count: usize, segments: usize) -> BenchEnv {
    let tmp = TempDir::new().unwrap();
    let mut writer = IndexWriter::open(tmp.path()).unwrap();
    let per_segment = doc_count.div_ceil(segments);

    for i in 0..doc_count {
        let id = format!("doc-{}", i);
        let doc = Document::new()
            .with_field("id", id.as_str())
            .with_field("title", format!("rust segment document {}", i))
            .with_field("tag", if i % 2 == 0 { "even" } else { "odd" });
        writer.add_document(&doc).unwrap();
        if i % 10 == 0 {
            writer.delete_term("id", &id);
        }
        if (i + 1) % per_segment == 0 {
            writer.commit().unwrap();
        }
    }
    writer.commit().unwrap();

    let snapshot = IndexSnapshot::open(tmp.path()).unwrap();
    BenchEnv { _tmp: tmp, snapshot }
}

fn build_envs() -> Vec<(usize, BenchEnv)> {
    [1_000usize, 10_000, 50_000]
        .iter()
        .map(|&count| (count, build_env(count, 4)))
        .collect()
}

fn bench_enumerate(c: &mut Criterion) {
    let envs = build_envs();

    let mut group = c.benchmark_group("enumerate_full");
    for (count, env) in envs.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), env, |b, env| {
            b.iter(|| {
                let range = enumerate(&env.snapshot, 0, i64::MAX).unwrap();
                black_box(range.count());
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("enumerate_tail_window");
    for (count, env) in envs.iter() {
        let offset = *count as i64 - 10;
        group.bench_with_input(BenchmarkId::from_parameter(count), env, |b, env| {
            b.iter(|| {
                let range = enumerate(&env.snapshot, offset, 10).unwrap();
                black_box(range.count());
            });
        });
    }
    group.finish();
}

fn bench_lookup_and_fetch(c: &mut Criterion) {
    let envs = build_envs();

    let mut group = c.benchmark_group("lookup_fetch");
    for (count, env) in envs.iter() {
        let target = format!("doc-{}", count - 1);
        group.bench_with_input(BenchmarkId::from_parameter(count), env, |b, env| {
            b.iter(|| {
                let outcome = lookup(&env.snapshot, "id", &target).unwrap();
                if let Some(ordinal) = outcome.ordinal() {
                    black_box(fetch(&env.snapshot, ordinal).unwrap());
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_enumerate, bench_lookup_and_fetch);
criterion_main!(benches);
