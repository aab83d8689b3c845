use criterion::{criterion_group, criterion_main};


criterion_group!(
    benches,
    cli::bench_tokenize,
    cli::bench_tokenize_quoted,
    cli::bench_dispatch,
    cli::bench_help
);
criterion_main!(benches);
