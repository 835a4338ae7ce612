use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use replset_types::{OpTimestamp, Optime, ReplSetStatusDoc, PRIMARY, SECONDARY};

fn snapshot_with_members(count: usize) -> ReplSetStatusDoc {
    let mut builder = ReplSetStatusDoc::builder().date_rfc3339("2024-01-01T00:00:00Z");
    for i in 0..count {
        let state = if i == 0 { PRIMARY } else { SECONDARY };
        let ts = OpTimestamp::new(1704067200 - i as u32, 1);
        builder = builder.member(format!("node{}:27017", i), |m| {
            m.optime(Optime::with_term(ts, 3)).state(state)
        });
    }
    builder.build()
}

/// Benchmark JSON serialization across typical replica-set sizes
fn bench_json_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_serialization");

    // 50 is the server's member limit
    for count in [0usize, 3, 7, 50] {
        let snapshot = snapshot_with_members(count);
        let json = serde_json::to_string(&snapshot).unwrap();
        group.throughput(Throughput::Bytes(json.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(count), &snapshot, |b, snapshot| {
            b.iter(|| {
                black_box(serde_json::to_string(snapshot).unwrap());
            });
        });
    }
    group.finish();
}

/// Benchmark JSON deserialization across typical replica-set sizes
fn bench_json_deserialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_deserialization");

    for count in [0usize, 3, 7, 50] {
        let json = serde_json::to_string(&snapshot_with_members(count)).unwrap();
        group.throughput(Throughput::Bytes(json.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(count), &json, |b, json| {
            b.iter(|| {
                black_box(serde_json::from_str::<ReplSetStatusDoc>(json).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_json_serialization, bench_json_deserialization);
criterion_main!(benches);
