use std::hint::black_box;

use codspeed_criterion_compat::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};

fn benchmark_tokenizer(c: &mut Criterion) {
    let inputs = [
        ("Simple", "port = 8080\nhost = \"localhost\"\n"),
        (
            "Medium",
            r#"
            # server settings
            server("main") {
                port: int = 8080;
                hosts = ["a.example", "b.example"]
                ratio = -0.75e2
                tls = true
            }

            limits(0x10, 0b1010, 1_000) {
                burst = rate(12)
            }
            "#,
        ),
    ];

    let mut group = c.benchmark_group("Tokenizer Benchmark");

    for (name, text) in inputs {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("tokenize", name), text, |b, text| {
            b.iter(|| black_box(cfg_tokenizer::tokenize(text)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_tokenizer);
criterion_main!(benches);
