//! Audio decoding using Symphonia
//!
//! Provides the two loader operations the estimator needs: a cheap duration
//! probe, and extraction of a mono segment at the fixed analysis sample rate
//! from an arbitrary offset into the track.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::i24;
use symphonia::core::units::Time;
use symphonia::default::get_probe;

use crate::error::EstimateError;
use crate::io::resample::resample;

/// Probe the total duration of a track in seconds
///
/// Prefers the frame count declared in the codec parameters; falls back to a
/// packet scan (no decoding) for formats that do not declare one.
///
/// # Errors
///
/// Returns `EstimateError::DecodingError` if the container cannot be probed
/// or carries no supported audio track.
pub fn track_duration(path: &Path) -> Result<f64, EstimateError> {
    let (mut format, track_id) = open_format(path)?;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.id == track_id)
        .ok_or_else(|| EstimateError::DecodingError("Audio track disappeared".to_string()))?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let time_base = track.codec_params.time_base;

    if let Some(n_frames) = track.codec_params.n_frames {
        let duration = n_frames as f64 / sample_rate as f64;
        log::debug!("Track duration from codec params: {:.2}s", duration);
        return Ok(duration);
    }

    // Fall back to summing packet durations without decoding
    let mut total_ts = 0u64;
    loop {
        match format.next_packet() {
            Ok(packet) => {
                if packet.track_id() == track_id {
                    total_ts += packet.dur();
                }
            }
            Err(_) => break,
        }
    }

    let duration = match time_base {
        Some(tb) => {
            let time = tb.calc_time(total_ts);
            time.seconds as f64 + time.frac
        }
        None => total_ts as f64 / sample_rate as f64,
    };

    log::debug!("Track duration from packet scan: {:.2}s", duration);
    Ok(duration)
}

/// Decode a mono waveform segment at the analysis sample rate
///
/// Seeks to `max(0, offset_seconds)` (falling back to decoding from the
/// start when the container cannot seek), downmixes to mono, keeps only the
/// samples inside the requested window, and resamples to `target_sr`.
///
/// # Arguments
///
/// * `path` - Track file path
/// * `offset_seconds` - Segment start in seconds
/// * `duration_seconds` - Segment length in seconds
/// * `target_sr` - Analysis sample rate in Hz
///
/// # Returns
///
/// Mono samples at `target_sr`. An offset past the end of the track yields
/// an empty segment rather than an error.
///
/// # Errors
///
/// Returns `EstimateError::DecodingError` for unreadable or unsupported
/// files; corrupt packets inside an otherwise decodable stream are skipped.
pub fn decode_segment(
    path: &Path,
    offset_seconds: f32,
    duration_seconds: f32,
    target_sr: u32,
) -> Result<Vec<f32>, EstimateError> {
    if !(duration_seconds > 0.0) {
        return Err(EstimateError::InvalidInput(format!(
            "Invalid segment duration: {}",
            duration_seconds
        )));
    }

    let offset_seconds = offset_seconds.max(0.0);
    let (mut format, track_id) = open_format(path)?;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.id == track_id)
        .ok_or_else(|| EstimateError::DecodingError("Audio track disappeared".to_string()))?;

    let source_sr = track.codec_params.sample_rate.unwrap_or(44100);
    let time_base = track.codec_params.time_base;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| EstimateError::DecodingError(format!("No decoder for track: {}", e)))?;

    let start_sample = (offset_seconds as f64 * source_sr as f64) as u64;
    let end_sample = start_sample + (duration_seconds as f64 * source_sr as f64) as u64;

    // Coarse seek toward the offset; a failed seek just means decoding from
    // the start and skipping
    if offset_seconds > 0.0 {
        let seek = format.seek(
            SeekMode::Accurate,
            SeekTo::Time {
                time: Time::from(offset_seconds as f64),
                track_id: Some(track_id),
            },
        );
        match seek {
            Ok(_) => decoder.reset(),
            Err(e) => log::debug!("Seek to {:.2}s failed ({}), decoding from start", offset_seconds, e),
        }
    }

    log::debug!(
        "Decoding segment: offset={:.2}s duration={:.2}s, samples [{}, {}) at {} Hz",
        offset_seconds,
        duration_seconds,
        start_sample,
        end_sample,
        source_sr
    );

    let mut segment: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(_) => break,
        };

        if packet.track_id() != track_id {
            continue;
        }

        // Packet position in source samples
        let packet_start = match time_base {
            Some(tb) => {
                let time = tb.calc_time(packet.ts());
                ((time.seconds as f64 + time.frac) * source_sr as f64).round() as u64
            }
            None => packet.ts(),
        };

        if packet_start >= end_sample {
            break;
        }

        let mono = match decoder.decode(&packet) {
            Ok(decoded) => downmix_to_mono(&decoded),
            Err(symphonia::core::errors::Error::DecodeError(msg)) => {
                log::debug!("Skipping corrupt packet: {}", msg);
                continue;
            }
            Err(e) => {
                return Err(EstimateError::DecodingError(format!(
                    "Decode failed: {}",
                    e
                )))
            }
        };

        let packet_end = packet_start + mono.len() as u64;
        if packet_end <= start_sample {
            continue;
        }

        let keep_from = start_sample.saturating_sub(packet_start) as usize;
        let keep_to = (end_sample.min(packet_end) - packet_start) as usize;
        if keep_from < keep_to && keep_to <= mono.len() {
            segment.extend_from_slice(&mono[keep_from..keep_to]);
        }
    }

    resample(&segment, source_sr, target_sr)
}

/// Probe a file and return its format reader plus the selected track id
fn open_format(path: &Path) -> Result<(Box<dyn FormatReader>, u32), EstimateError> {
    let src = File::open(path)
        .map_err(|e| EstimateError::DecodingError(format!("Cannot open {:?}: {}", path, e)))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| EstimateError::DecodingError(format!("Unsupported format: {}", e)))?;
    let format = probed.format;

    let track_id = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .map(|t| t.id)
        .ok_or_else(|| {
            EstimateError::DecodingError("No supported audio tracks found".to_string())
        })?;

    Ok((format, track_id))
}

/// Convert i24 to f32
fn i24_to_f32(sample: i24) -> f32 {
    sample.inner() as f32
}

/// Downmix a decoded buffer to mono by averaging channels
fn downmix_to_mono(decoded: &AudioBufferRef<'_>) -> Vec<f32> {
    let spec = *decoded.spec();
    let channels = spec.channels.count();

    match decoded {
        AudioBufferRef::F32(buf) => average_channels(buf.frames(), channels, |ch, i| {
            buf.chan(ch)[i]
        }),
        AudioBufferRef::F64(buf) => average_channels(buf.frames(), channels, |ch, i| {
            buf.chan(ch)[i] as f32
        }),
        AudioBufferRef::S16(buf) => average_channels(buf.frames(), channels, |ch, i| {
            buf.chan(ch)[i] as f32 / 32768.0
        }),
        AudioBufferRef::S24(buf) => average_channels(buf.frames(), channels, |ch, i| {
            i24_to_f32(buf.chan(ch)[i]) / 8388608.0
        }),
        AudioBufferRef::S32(buf) => average_channels(buf.frames(), channels, |ch, i| {
            buf.chan(ch)[i] as f32 / 2147483648.0
        }),
        AudioBufferRef::U8(buf) => average_channels(buf.frames(), channels, |ch, i| {
            (buf.chan(ch)[i] as f32 - 128.0) / 128.0
        }),
        _ => {
            log::warn!("Unsupported sample format in packet, emitting silence");
            Vec::new()
        }
    }
}

fn average_channels<F>(frames: usize, channels: usize, sample_at: F) -> Vec<f32>
where
    F: Fn(usize, usize) -> f32,
{
    if channels == 1 {
        return (0..frames).map(|i| sample_at(0, i)).collect();
    }
    (0..frames)
        .map(|i| (0..channels).map(|ch| sample_at(ch, i)).sum::<f32>() / channels as f32)
        .collect()
}
