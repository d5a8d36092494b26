use rand::prelude::*;
use viz_core::*;

struct Bytes(Option<Vec<u8>>);

impl FrequencySource for Bytes {
    fn read_frequencies(&self, out: &mut Vec<u8>) -> bool {
        match &self.0 {
            Some(raw) => {
                out.clear();
                out.extend_from_slice(raw);
                true
            }
            None => false,
        }
    }
}

#[test]
fn default_band_split_uses_floor_boundaries() {
    let [bass, mids, highs] = band_ranges(BIN_COUNT);
    assert_eq!(bass, 0..9);
    assert_eq!(mids, 9..35);
    assert_eq!(highs, 35..64);
}

#[test]
fn band_ranges_cover_every_index_once() {
    for n in 0..=256usize {
        let ranges = band_ranges(n);
        let mut seen = vec![0u32; n];
        for range in ranges.iter() {
            assert!(range.start <= range.end, "inverted range for n={n}");
            for i in range.clone() {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1), "gap or overlap for n={n}");
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges[2].end, n);
    }
}

#[test]
fn random_spectra_stay_in_unit_range() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut frame = SpectrumFrame::default();
    for _ in 0..200 {
        let len = rng.gen_range(0..2048);
        let raw: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        frame.fill_from_bytes(&raw);
        assert_eq!(frame.bins.len(), BIN_COUNT);
        for v in frame.bins.iter().chain([frame.bass, frame.mids, frame.highs].iter()) {
            assert!((0.0..=1.0).contains(v), "value {v} out of range (len {len})");
        }
    }
}

#[test]
fn downsampling_picks_one_sample_per_stride() {
    let raw: Vec<u8> = (0..1024).map(|j| (j % 256) as u8).collect();
    let mut frame = SpectrumFrame::default();
    frame.fill_from_bytes(&raw);
    // stride is 1024 / 64 = 16
    for i in 0..BIN_COUNT {
        let expected = ((i * 16) % 256) as f32 / 255.0;
        assert!((frame.bins[i] - expected).abs() < 1e-6, "bin {i}");
    }
}

#[test]
fn short_spectra_use_nearest_available_sample() {
    let raw: Vec<u8> = vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 255];
    let mut frame = SpectrumFrame::default();
    frame.fill_from_bytes(&raw);
    assert_eq!(frame.bins[9], 1.0);
    assert_eq!(frame.bins[20], 1.0);
    assert_eq!(frame.bins[63], 1.0);
    assert_eq!(frame.bins[3], 0.0);
}

#[test]
fn aggregates_average_their_own_range() {
    // Only the bass bands are loud.
    let mut raw = vec![0u8; 1024];
    for i in 0..9 {
        raw[i * 16] = 255;
    }
    let mut frame = SpectrumFrame::default();
    frame.fill_from_bytes(&raw);
    assert!((frame.bass - 1.0).abs() < 1e-6);
    assert_eq!(frame.mids, 0.0);
    assert_eq!(frame.highs, 0.0);

    frame.fill_from_bytes(&vec![255u8; 1024]);
    assert!((frame.bass - 1.0).abs() < 1e-6);
    assert!((frame.mids - 1.0).abs() < 1e-6);
    assert!((frame.highs - 1.0).abs() < 1e-6);
}

#[test]
fn analyzer_without_active_node_returns_zero_frame() {
    let mut analyzer = SpectralAnalyzer::new();
    let loud = Bytes(Some(vec![200; 1024]));
    assert!(analyzer.sample(&loud).bins.iter().all(|&v| v > 0.0));

    let idle = Bytes(None);
    let frame = analyzer.sample(&idle);
    assert_eq!(*frame, SpectrumFrame::default());
}

#[test]
fn analyzer_overwrites_the_same_frame_each_call() {
    let mut analyzer = SpectralAnalyzer::new();
    analyzer.sample(&Bytes(Some(vec![255; 1024])));
    assert_eq!(analyzer.frame().bins[0], 1.0);
    analyzer.sample(&Bytes(Some(vec![0; 1024])));
    assert_eq!(analyzer.frame().bins[0], 0.0);
    assert_eq!(analyzer.frame().bass, 0.0);
}
