//! Per-frame spectral decomposition.
//!
//! The analysis node delivers a wide byte spectrum (1024 bins for the default
//! FFT size). Renderers only need [`BIN_COUNT`] bands plus three aggregate
//! energies, so every frame the raw data is strided down by picking one sample
//! per `floor(raw_len / BIN_COUNT)` bins. There is no interpolation or
//! decimation filter; the picked sample is used as-is.

use crate::constants::{BASS_FRACTION, BIN_COUNT, BYTE_MAGNITUDE_MAX, MID_END_FRACTION};
use std::ops::Range;

/// One frame of normalized bands plus bass/mid/high averages, all in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectrumFrame {
    pub bins: [f32; BIN_COUNT],
    pub bass: f32,
    pub mids: f32,
    pub highs: f32,
}

impl Default for SpectrumFrame {
    fn default() -> Self {
        Self {
            bins: [0.0; BIN_COUNT],
            bass: 0.0,
            mids: 0.0,
            highs: 0.0,
        }
    }
}

impl SpectrumFrame {
    pub fn clear(&mut self) {
        self.bins.fill(0.0);
        self.bass = 0.0;
        self.mids = 0.0;
        self.highs = 0.0;
    }

    /// Overwrites this frame from raw byte magnitudes.
    pub fn fill_from_bytes(&mut self, raw: &[u8]) {
        if raw.is_empty() {
            self.clear();
            return;
        }
        let step = (raw.len() / BIN_COUNT).max(1);
        let last = raw.len() - 1;
        for (i, bin) in self.bins.iter_mut().enumerate() {
            let idx = (i * step).min(last);
            *bin = (raw[idx] as f32 / BYTE_MAGNITUDE_MAX).clamp(0.0, 1.0);
        }
        let [bass, mids, highs] = band_ranges(BIN_COUNT);
        self.bass = average(&self.bins[bass]);
        self.mids = average(&self.bins[mids]);
        self.highs = average(&self.bins[highs]);
    }
}

/// Contiguous bass, mid and high index ranges over `n` bands.
///
/// Boundaries are `floor(0.15 * n)` and `floor(0.55 * n)`, so for 64 bands the
/// split is `[0, 9)`, `[9, 35)` and `[35, 64)`.
pub fn band_ranges(n: usize) -> [Range<usize>; 3] {
    let bass_end = ((n as f64 * BASS_FRACTION as f64).floor() as usize).min(n);
    let mid_end = ((n as f64 * MID_END_FRACTION as f64).floor() as usize).clamp(bass_end, n);
    [0..bass_end, bass_end..mid_end, mid_end..n]
}

#[inline]
fn average(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len().max(1) as f32
}

/// Anything that can hand out the current byte magnitudes of an analysis node.
pub trait FrequencySource {
    /// Fills `out` with the current spectrum, resizing it as needed.
    /// Returns `false` when no analysis node is active.
    fn read_frequencies(&self, out: &mut Vec<u8>) -> bool;
}

/// Owns the scratch buffer for raw magnitudes and the frame handed to renderers.
///
/// [`sample`](SpectralAnalyzer::sample) overwrites the same frame every call, so
/// the returned reference is only meaningful until the next call.
#[derive(Default)]
pub struct SpectralAnalyzer {
    raw: Vec<u8>,
    frame: SpectrumFrame,
}

impl SpectralAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample<S: FrequencySource + ?Sized>(&mut self, source: &S) -> &SpectrumFrame {
        if source.read_frequencies(&mut self.raw) {
            self.frame.fill_from_bytes(&self.raw);
        } else {
            self.frame.clear();
        }
        &self.frame
    }

    /// The frame produced by the most recent `sample` call.
    pub fn frame(&self) -> &SpectrumFrame {
        &self.frame
    }
}
