// Compile-time tuning shared by the analyzer, the renderers and the web front-end.

// Spectrum
pub const BIN_COUNT: usize = 64; // bands handed to the renderers each frame
pub const BASS_FRACTION: f32 = 0.15; // bass covers [0, 0.15 * N)
pub const MID_END_FRACTION: f32 = 0.55; // mids cover [0.15 * N, 0.55 * N), highs the rest
pub const BYTE_MAGNITUDE_MAX: f32 = 255.0;

// Analyser node
pub const FFT_SIZE: u32 = 2048; // 1024 raw frequency bins
pub const SMOOTHING_TIME_CONSTANT: f64 = 0.85;

// Output routing
pub const AUDIBLE_GAIN: f32 = 1.0;
pub const SILENT_GAIN: f32 = 0.0; // microphone monitoring, avoids feedback

// Bar chart layout (CSS pixels)
pub const BAR_MIN_HEIGHT_PX: f64 = 4.0;
pub const BAR_VERTICAL_RESERVE_PX: f64 = 60.0;
pub const BASELINE_OFFSET_PX: f64 = 24.0;
pub const BASELINE_HEIGHT_PX: f64 = 2.0;
pub const BAR_INSET: f64 = 0.12; // fraction of the slot left empty before a bar
pub const BAR_WIDTH: f64 = 0.76; // fraction of the slot filled by a bar
pub const BAR_MAX_RADIUS_PX: f64 = 10.0;
pub const BAR_RADIUS_OF_SLOT: f64 = 0.35;

// Bar chart palette
pub const FFT_BACKGROUND: &str = "rgba(10, 14, 24, 0.85)";
pub const FFT_BASELINE: &str = "rgba(255, 255, 255, 0.06)";
pub const FFT_GRADIENT_TOP_OF_HEIGHT: f64 = 0.2; // gradient runs bottom -> 20% from top
pub const FFT_GRADIENT_STOPS: [(f32, &str); 3] = [
    (0.0, "rgba(86, 194, 255, 0.28)"),
    (0.5, "rgba(139, 155, 255, 0.4)"),
    (1.0, "rgba(255, 113, 64, 0.45)"),
];

// Seek control granularity (seconds)
pub const SEEK_STEP_SEC: f64 = 0.05;
