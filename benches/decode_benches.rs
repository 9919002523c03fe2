use criterion::{black_box, criterion_group, criterion_main, Criterion};
use iregul::{decode, BinarySensor, Sensor, Snapshot};

fn full_response() -> String {
    let mut response: String = Sensor::ALL
        .iter()
        .map(|s| format!("#{}[21.5]", s.id()))
        .chain(BinarySensor::ALL.iter().map(|s| format!("#{}[1]", s.id())))
        .collect();

    // Real responses carry a few hundred registers.
    for i in 0..400 {
        response.push_str(&format!("#R@{i}&valeur[{i}.0]"));
    }
    response.push('\r');
    response
}

fn bench_decode(c: &mut Criterion) {
    let response = full_response();

    c.bench_function("decode full response", |b| {
        b.iter(|| decode(black_box(&response)))
    });

    c.bench_function("snapshot from bytes", |b| {
        b.iter(|| Snapshot::from_bytes(black_box(response.as_bytes())))
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
