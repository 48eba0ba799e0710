//! Integration tests for the tempo estimation pipeline
//!
//! Fixtures are synthesized on the fly: click tracks written as WAV files
//! with hound, then run through the full decode → estimate path.

use std::path::PathBuf;

use cadence_dsp::io::decoder::{decode_segment, track_duration};
use cadence_dsp::{estimate_bpm, EstimatorConfig};

/// Write a mono 22050 Hz WAV of the given length, with a click every beat
///
/// `bpm = None` writes silence instead.
fn write_fixture(name: &str, seconds: f32, bpm: Option<f32>) -> PathBuf {
    let sample_rate = 22050u32;
    let path = std::env::temp_dir().join(format!("cadence-dsp-{}-{}.wav", std::process::id(), name));

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("create fixture WAV");

    let n_samples = (seconds * sample_rate as f32) as usize;
    let period = bpm.map(|bpm| (60.0 * sample_rate as f32 / bpm) as usize);

    for i in 0..n_samples {
        // Broadband click (single-sample impulse) on each beat
        let value = match period {
            Some(period) if i % period == 0 => 0.9f32,
            _ => 0.0,
        };
        writer
            .write_sample((value * 32767.0) as i16)
            .expect("write sample");
    }
    writer.finalize().expect("finalize fixture WAV");
    path
}

#[test]
fn test_track_duration_matches_fixture() {
    let path = write_fixture("duration", 30.0, None);
    let duration = track_duration(&path).expect("duration probe should succeed");
    assert!(
        (duration - 30.0).abs() < 0.1,
        "Expected ~30s, got {:.2}s",
        duration
    );
}

#[test]
fn test_decode_segment_honors_offset_and_duration() {
    let path = write_fixture("segment", 30.0, Some(120.0));

    let segment = decode_segment(&path, 5.0, 10.0, 22050).expect("segment decode");
    let expected = 10 * 22050;
    assert!(
        (segment.len() as i64 - expected as i64).abs() < 22050 / 10,
        "Expected ~{} samples, got {}",
        expected,
        segment.len()
    );
}

#[test]
fn test_decode_segment_truncates_at_end_of_track() {
    let path = write_fixture("segment-tail", 30.0, Some(120.0));

    // 25s offset into a 30s track leaves ~5s of audio
    let segment = decode_segment(&path, 25.0, 90.0, 22050).expect("segment decode");
    let expected = 5 * 22050;
    assert!(
        (segment.len() as i64 - expected as i64).abs() < 22050 / 10,
        "Expected ~{} samples, got {}",
        expected,
        segment.len()
    );
}

#[test]
fn test_decode_segment_past_end_is_empty() {
    let path = write_fixture("segment-past-end", 10.0, None);
    let segment = decode_segment(&path, 60.0, 90.0, 22050).expect("segment decode");
    assert!(
        segment.is_empty(),
        "Offset past EOF should yield an empty segment, got {} samples",
        segment.len()
    );
}

#[test]
fn test_estimate_bpm_click_track() {
    // 34 seconds: the first window (offset 3.4s) spans >20s of audio and
    // produces an estimate; the later windows are too short and are skipped.
    let path = write_fixture("click-120", 34.0, Some(120.0));

    let estimate = estimate_bpm(&path, &EstimatorConfig::default())
        .expect("estimation should not error")
        .expect("click track should produce an estimate");

    assert!(
        (75.0..190.0).contains(&estimate.bpm),
        "BPM should land in the canonical range, got {:.1}",
        estimate.bpm
    );
    assert!(
        (estimate.bpm - 120.0).abs() < 10.0,
        "Expected BPM near 120, got {:.1}",
        estimate.bpm
    );
    assert!(
        (0.0..=1.0).contains(&estimate.confidence),
        "Confidence out of range: {:.2}",
        estimate.confidence
    );
}

#[test]
fn test_estimate_bpm_empty_track_is_absent() {
    // A zero-duration track short-circuits before window selection
    let path = write_fixture("empty", 0.0, None);

    let estimate = estimate_bpm(&path, &EstimatorConfig::default())
        .expect("estimation should not error");
    assert!(estimate.is_none(), "Empty track should have no estimate");
}

#[test]
fn test_estimate_bpm_short_track_is_absent() {
    // Every window of a 10s track decodes fewer than 20s of audio
    let path = write_fixture("too-short", 10.0, Some(120.0));

    let estimate = estimate_bpm(&path, &EstimatorConfig::default())
        .expect("estimation should not error");
    assert!(estimate.is_none(), "Short track should have no estimate");
}

#[test]
fn test_estimate_bpm_silent_track_is_absent() {
    let path = write_fixture("silent", 34.0, None);

    let estimate = estimate_bpm(&path, &EstimatorConfig::default())
        .expect("estimation should not error");
    assert!(estimate.is_none(), "Silent track should have no estimate");
}

#[test]
fn test_estimate_bpm_missing_file_errors() {
    let path = PathBuf::from("/nonexistent/cadence-dsp-no-such-track.wav");
    assert!(estimate_bpm(&path, &EstimatorConfig::default()).is_err());
}
