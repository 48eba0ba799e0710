//! Performance benchmarks for the per-window estimation core

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cadence_dsp::features::onset::hpss::percussive_component;
use cadence_dsp::features::onset::strength::onset_envelope;
use cadence_dsp::features::spectrum::compute_stft;
use cadence_dsp::features::tempo::beat_tracker::beat_track_tempo;
use cadence_dsp::features::tempo::estimator::tempo_from_envelope;

/// 30 seconds of a 120 BPM impulse click track at 22050 Hz
fn click_track() -> Vec<f32> {
    let sample_rate = 22050usize;
    let period = sample_rate / 2;
    (0..sample_rate * 30)
        .map(|i| if i % period == 0 { 0.9 } else { 0.0 })
        .collect()
}

fn bench_onset_envelope(c: &mut Criterion) {
    let samples = click_track();

    c.bench_function("onset_envelope_30s", |b| {
        b.iter(|| {
            let spec = compute_stft(black_box(&samples), 2048, 512).unwrap();
            let perc = percussive_component(&spec, 31, 2.0).unwrap();
            onset_envelope(&perc, 22050, 128).unwrap()
        });
    });
}

fn bench_tempo_candidates(c: &mut Criterion) {
    let samples = click_track();
    let spec = compute_stft(&samples, 2048, 512).unwrap();
    let perc = percussive_component(&spec, 31, 2.0).unwrap();
    let envelope = onset_envelope(&perc, 22050, 128).unwrap();
    let frame_rate = 22050.0 / 512.0;

    c.bench_function("tempo_candidates_30s", |b| {
        b.iter(|| {
            let onset_tempo =
                tempo_from_envelope(black_box(&envelope), frame_rate, 120.0, 384).unwrap();
            beat_track_tempo(&envelope, frame_rate, onset_tempo, 100.0).unwrap()
        });
    });
}

criterion_group!(benches, bench_onset_envelope, bench_tempo_candidates);
criterion_main!(benches);
