// tests/waveform_properties.rs
//! Property tests for the waveform generator and the sample buffer

use proptest::prelude::*;
use vent_sim::acquisition::{BufferConfig, BufferManager};
use vent_sim::waveform::pressure_control::PressureControlPhases;
use vent_sim::waveform::{generate, generate_with_phase, BreathPhase, CycleTiming, Sample};
use vent_sim::{VentilationMode, VentilatorSettings};

fn mode_strategy() -> impl Strategy<Value = VentilationMode> {
    prop_oneof![
        Just(VentilationMode::VolumeControlled),
        Just(VentilationMode::PressureControlled),
    ]
}

prop_compose! {
    fn valid_settings()(
        mode in mode_strategy(),
        respiratory_rate in 5.0f64..=50.0,
        tidal_volume_ml in 200.0f64..=1000.0,
        peep in 0.0f64..=20.0,
        peak_pressure in 10.0f64..=40.0,
        ie_tenths in 5u32..=30,
        pressure_support in 5.0f64..=40.0,
        plateau_time in 0.1f64..=1.0,
        resistance in 5.0f64..=50.0,
        compliance in 0.01f64..=0.1,
    ) -> VentilatorSettings {
        VentilatorSettings {
            mode,
            respiratory_rate,
            tidal_volume_ml,
            peep,
            peak_pressure,
            ie_ratio: ie_tenths as f64 / 10.0,
            pressure_support,
            plateau_time,
            resistance,
            compliance,
        }
    }
}

proptest! {
    #[test]
    fn generated_samples_are_finite(settings in valid_settings(), elapsed in 0.0f64..3600.0) {
        let sample = generate(&settings, elapsed).unwrap();
        prop_assert!(sample.is_finite());
        prop_assert_eq!(sample.time, elapsed);
    }

    #[test]
    fn generation_is_deterministic(settings in valid_settings(), elapsed in 0.0f64..600.0) {
        prop_assert_eq!(generate(&settings, elapsed).unwrap(), generate(&settings, elapsed).unwrap());
    }

    #[test]
    fn volume_control_inspiration_is_monotone(
        settings in valid_settings(),
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
    ) {
        let settings = VentilatorSettings {
            mode: VentilationMode::VolumeControlled,
            peak_pressure: settings.peep + 10.0,
            ..settings
        };
        let ti = CycleTiming::new(&settings, 0.0).inspiratory_time;
        let (early, late) = if a <= b { (a, b) } else { (b, a) };

        let (first, phase_first) = generate_with_phase(&settings, early * ti).unwrap();
        let (second, phase_second) = generate_with_phase(&settings, late * ti).unwrap();
        prop_assume!(phase_first == BreathPhase::Inspiration && phase_second == BreathPhase::Inspiration);

        prop_assert!(first.volume <= second.volume + 1e-9);
        prop_assert!(first.pressure <= second.pressure + 1e-9);
        prop_assert!(second.pressure <= settings.peak_pressure + 1e-9);
    }

    #[test]
    fn pressure_control_ramp_rises_toward_support(
        settings in valid_settings(),
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
    ) {
        let settings = VentilatorSettings {
            mode: VentilationMode::PressureControlled,
            ..settings
        };
        let timing = CycleTiming::new(&settings, 0.0);
        let ramp = PressureControlPhases::new(&settings, &timing).ramp_time;
        let (early, late) = if a <= b { (a, b) } else { (b, a) };

        let (first, phase_first) = generate_with_phase(&settings, early * ramp).unwrap();
        let (second, phase_second) = generate_with_phase(&settings, late * ramp).unwrap();
        prop_assert_eq!(phase_first, BreathPhase::Inspiration);
        prop_assert_eq!(phase_second, BreathPhase::Inspiration);

        let ceiling = settings.peep + settings.pressure_support;
        prop_assert!(first.pressure >= settings.peep - 1e-9);
        prop_assert!(first.pressure <= second.pressure + 1e-9);
        prop_assert!(second.pressure <= ceiling + 1e-9);
        prop_assert!(first.volume <= second.volume + 1e-9);
        prop_assert!(first.flow + 1e-9 >= second.flow);
    }

    #[test]
    fn buffer_never_exceeds_capacity(
        points_per_cycle in 1usize..50,
        max_cycles in 1usize..5,
        appends in 0usize..400,
    ) {
        let config = BufferConfig {
            points_per_cycle,
            max_cycles,
            window_size_secs: 6.0,
        };
        let capacity = config.capacity();
        let mut buffers = BufferManager::new(config).unwrap();
        let settings = VentilatorSettings::default();

        for i in 0..appends {
            buffers.append(generate(&settings, i as f64 * 0.05).unwrap()).unwrap();
            prop_assert!(buffers.len() <= capacity);
        }
        prop_assert_eq!(buffers.len(), appends.min(capacity));
    }

    #[test]
    fn visible_window_invariant(
        steps in proptest::collection::vec(0.0f64..0.5, 1..300),
        window in 0.5f64..20.0,
    ) {
        let mut buffers = BufferManager::new(BufferConfig::default()).unwrap();
        let mut t = 0.0;
        for step in steps {
            t += step;
            buffers.append(Sample { time: t, pressure: 5.0, flow: 0.0, volume: 0.0 }).unwrap();
        }

        let view = buffers.visible_window(window);
        prop_assert_eq!(view.t_max, t);
        prop_assert_eq!(view.t_min, (t - window).max(0.0));
        prop_assert!(!view.samples.is_empty());
        for sample in &view.samples {
            prop_assert!(sample.time >= view.t_min && sample.time <= view.t_max);
        }
    }
}

#[test]
fn reference_cycle_timing() {
    let settings = VentilatorSettings::default();
    let timing = CycleTiming::new(&settings, 0.0);
    assert!((timing.total_time - 4.0).abs() < 1e-12);
    assert!((timing.inspiratory_time - 2.1818).abs() < 1e-3);
    assert!((timing.expiratory_time - 1.8182).abs() < 1e-3);

    let sample = generate(&settings, 0.0).unwrap();
    assert_eq!(sample.volume, 0.0);
    assert_eq!(sample.pressure, settings.peep);
}

#[test]
fn degenerate_resistance_is_reported() {
    let settings = VentilatorSettings {
        mode: VentilationMode::PressureControlled,
        resistance: 0.0,
        ..Default::default()
    };
    let timing = CycleTiming::new(&settings, 0.0);
    // Peak flow divides by the resistance
    assert!(generate(&settings, timing.inspiratory_time * 0.9).is_err());
}
