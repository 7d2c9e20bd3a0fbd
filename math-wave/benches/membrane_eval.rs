use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use math_audio_wave::{Boundary, FlexuralPlate, Membrane, Wavepacket};

fn plate_packet() -> Wavepacket {
    // 2 mm aluminium
    let plate = FlexuralPlate::from_material(70e9, 0.33, 2700.0, 0.002).unwrap();
    Wavepacket::builder()
        .dispersion(plate)
        .spectrum((1..=8).map(|i| 250.0 * i as f64))
        .build()
        .unwrap()
}

fn bench_wavepacket_eval(c: &mut Criterion) {
    let mut packet = plate_packet();
    packet.set_sampling_frequency(20_000.0).unwrap();
    packet.set_spatial_step(0.005).unwrap();
    packet.set_space_boundary(1.0).unwrap();
    packet.set_time_boundary(0.01).unwrap();

    c.bench_function("wavepacket_eval", |b| {
        b.iter(|| {
            packet.eval(false).unwrap();
            black_box(packet.data());
        })
    });
}

fn bench_membrane_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("membrane_eval");
    group.sample_size(10);

    for order in [0usize, 1, 2] {
        let boundary = match order {
            0 => Boundary::Transparent,
            n => Boundary::Order(n),
        };
        let mut membrane = Membrane::builder(20_000.0, 0.01, (0.6, 0.4), 0.005)
            .boundary(boundary)
            .source(plate_packet(), (0.05, -0.03))
            .build()
            .unwrap();

        group.bench_with_input(BenchmarkId::new("sequential", order), &order, |b, _| {
            membrane.set_parallel(false);
            b.iter(|| membrane.eval().unwrap())
        });

        #[cfg(feature = "parallel")]
        group.bench_with_input(BenchmarkId::new("parallel", order), &order, |b, _| {
            membrane.set_parallel(true);
            b.iter(|| membrane.eval().unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_wavepacket_eval, bench_membrane_eval);
criterion_main!(benches);
