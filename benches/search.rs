//! Benchmarks for memory search.
//!
//! TF-IDF vectors are recomputed on every query, so search cost grows with
//! the corpus. These benchmarks cover:
//! - Pure ranking over synthetic in-memory corpora
//! - Full search through a persisted, current index
//! - Scaling across corpus sizes

// Criterion macros generate items without docs - this is expected for benchmarks
// Benchmarks use expect/unwrap for simplicity - panics are acceptable in benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use aurora_memory::models::{Category, IndexEntry};
use aurora_memory::services::{IndexBuilder, RetrievalService, extract_tags, rank, truncate_item};
use aurora_memory::storage::{FilesystemStore, MemoryStore};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

const TOPICS: &[&str] = &[
    "cafe quente pela manha antes do trabalho",
    "viagem para a praia no feriado prolongado",
    "livro de ficcao cientifica emprestado pela irma",
    "consulta medica marcada para a proxima semana",
    "receita de bolo de cenoura com cobertura",
    "treino de corrida no parque aos domingos",
    "reuniao com a equipe sobre o novo projeto",
    "gato adotado no abrigo do bairro",
];

/// Generates a deterministic memory item.
fn synthetic_text(i: usize) -> String {
    let topic = TOPICS[i % TOPICS.len()];
    let other = TOPICS[(i * 7 + 3) % TOPICS.len()];
    format!("registro {i}: {topic}; lembrou tambem de {other}")
}

fn synthetic_entries(count: usize) -> Vec<IndexEntry> {
    (0..count)
        .map(|i| {
            let text = synthetic_text(i);
            IndexEntry {
                path: format!("long_term/item_{i}.txt"),
                category: Category::LongTerm,
                mtime: 0.0,
                summary: truncate_item(&text, 200),
                tags: extract_tags(&text, 8),
                full_text: text,
            }
        })
        .collect()
}

/// Writes `count` items into a filesystem store and builds its index.
fn populate_store(temp_dir: &TempDir, count: usize) -> RetrievalService {
    let store = Arc::new(FilesystemStore::new(temp_dir.path().join("memory")));
    for i in 0..count {
        store
            .write(Category::LongTerm, &format!("item_{i}.txt"), &synthetic_text(i))
            .expect("Failed to write memory item");
    }
    let builder = IndexBuilder::new(store, temp_dir.path().join("memory_index.json"));
    builder.build(true).expect("Failed to build index");
    RetrievalService::new(builder)
}

// ============================================================================
// Ranking Benchmarks
// ============================================================================

fn bench_rank(c: &mut Criterion) {
    let entries = synthetic_entries(1_000);
    let refs: Vec<&IndexEntry> = entries.iter().collect();

    let mut group = c.benchmark_group("rank_1000_entries");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("single_term", |b| {
        b.iter(|| rank(black_box(&refs), black_box("cafe"), 8));
    });

    group.bench_function("multi_term", |b| {
        b.iter(|| rank(black_box(&refs), black_box("viagem praia feriado cenoura"), 8));
    });

    group.bench_function("no_match", |b| {
        b.iter(|| rank(black_box(&refs), black_box("astronomia telescopio"), 8));
    });

    group.finish();
}

// ============================================================================
// Search Benchmarks
// ============================================================================

fn bench_search_current_index(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let retrieval = populate_store(&temp_dir, 500);

    let mut group = c.benchmark_group("search_500_memories");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("scoped_search", |b| {
        b.iter(|| {
            retrieval
                .search(black_box("corrida parque"), &[Category::LongTerm], 8)
                .expect("Search should succeed")
        });
    });

    group.bench_function("unscoped_search", |b| {
        b.iter(|| {
            retrieval
                .search(black_box("corrida parque"), &[], 8)
                .expect("Search should succeed")
        });
    });

    group.finish();
}

fn bench_rank_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_scaling");
    group.measurement_time(Duration::from_secs(10));

    for count in &[10, 100, 1_000, 5_000] {
        let entries = synthetic_entries(*count);
        let refs: Vec<&IndexEntry> = entries.iter().collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &refs, |b, refs| {
            b.iter(|| rank(black_box(refs), black_box("receita bolo cenoura"), 8));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_rank,
    bench_search_current_index,
    bench_rank_scaling
);
criterion_main!(benches);
