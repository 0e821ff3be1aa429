use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use vent_sim::acquisition::{BufferConfig, BufferManager};
use vent_sim::config::SimulatorConfig;
use vent_sim::monitoring::MonitorConfig;
use vent_sim::utils::time::MockTimeProvider;
use vent_sim::waveform::generate;
use vent_sim::{SimulationSession, VentilationMode, VentilatorSettings};

const RESPIRATORY_RATES: &[f64] = &[5.0, 15.0, 30.0, 50.0];
const HISTORY_CYCLES: &[usize] = &[1, 3, 10];

fn benchmark_generator(c: &mut Criterion) {
    let mut group = c.benchmark_group("generator");
    group.throughput(Throughput::Elements(1000));

    for mode in [VentilationMode::VolumeControlled, VentilationMode::PressureControlled] {
        for &rate in RESPIRATORY_RATES {
            let settings = VentilatorSettings {
                mode,
                respiratory_rate: rate,
                ..Default::default()
            };

            group.bench_with_input(
                BenchmarkId::new(mode.label(), format!("{rate}rpm")),
                &settings,
                |b, settings| {
                    b.iter(|| {
                        for i in 0..1000 {
                            let _ = black_box(generate(settings, black_box(i as f64 * 0.033)));
                        }
                    });
                },
            );
        }
    }

    group.finish();
}

fn benchmark_buffer_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer");
    let settings = VentilatorSettings::default();

    for &cycles in HISTORY_CYCLES {
        let config = BufferConfig {
            max_cycles: cycles,
            ..Default::default()
        };
        group.throughput(Throughput::Elements(config.capacity() as u64));

        group.bench_with_input(
            BenchmarkId::new("append_full", format!("{}pts", config.capacity())),
            &config,
            |b, config| {
                b.iter(|| {
                    let mut buffers = BufferManager::new(config.clone()).unwrap();
                    for i in 0..config.capacity() * 2 {
                        let sample = generate(&settings, i as f64 * 0.066).unwrap();
                        let _ = buffers.append(black_box(sample));
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("render_frame", format!("{}pts", config.capacity())),
            &config,
            |b, config| {
                let mut buffers = BufferManager::new(config.clone()).unwrap();
                for i in 0..config.capacity() {
                    let _ = buffers.append(generate(&settings, i as f64 * 0.066).unwrap());
                }
                b.iter(|| black_box(buffers.render_frame()));
            },
        );
    }

    group.finish();
}

fn benchmark_session_tick(c: &mut Criterion) {
    let config = SimulatorConfig {
        monitoring: MonitorConfig {
            seed: Some(1),
            ..Default::default()
        },
        ..Default::default()
    };
    let clock = Arc::new(MockTimeProvider::new(0));
    let mut session = SimulationSession::with_time_provider(&config, clock.clone()).unwrap();
    session.start();

    c.bench_function("session_tick", |b| {
        b.iter(|| {
            clock.advance_secs_f64(0.066);
            black_box(session.tick().unwrap());
        });
    });
}

criterion_group!(
    benches,
    benchmark_generator,
    benchmark_buffer_operations,
    benchmark_session_tick
);
criterion_main!(benches);
