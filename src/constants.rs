//! Application constants and configuration values

/// Level estimator tuning
pub mod estimator {
    /// Starting estimate of the ambient noise floor (RMS units)
    pub const INITIAL_BASELINE_NOISE: f32 = 0.001;
    /// Starting peak reference (RMS units)
    pub const INITIAL_PEAK: f32 = 0.1;
    /// A block counts as noise when its RMS is below baseline times this ratio
    pub const NOISE_GATE_RATIO: f32 = 3.0;
    /// Exponential smoothing factor applied to the baseline on noise blocks
    pub const NOISE_SMOOTHING: f32 = 0.1;
    /// Hard ceiling for the adapted baseline so it never masks quiet speech
    pub const BASELINE_CAP: f32 = 0.0001;
    /// Fraction of the peak kept per block while releasing
    pub const PEAK_RELEASE: f32 = 0.995;
    /// Fixed linear gain applied to RMS before clamping
    pub const GAIN: f32 = 30.0;
    /// Power-law exponent that lifts quiet levels
    pub const EXPONENT: f64 = 0.4;
}

/// Diagnostic throttling
pub mod diagnostics {
    use std::time::Duration;

    /// Minimum spacing between "no consumer" warnings
    pub const NO_CONSUMER_LOG_INTERVAL: Duration = Duration::from_secs(5);
    /// Minimum spacing between "no sample data" warnings
    pub const UNAVAILABLE_DATA_LOG_INTERVAL: Duration = Duration::from_secs(10);
}

/// Level stream and pipeline sizing
pub mod stream {
    /// Levels retained per receiver before the oldest are overwritten
    pub const LEVEL_CHANNEL_CAPACITY: usize = 256;
}

/// Audio capture constants
pub mod audio {
    /// Preferred capture rate when the device supports it
    pub const PREFERRED_SAMPLE_RATE: u32 = 44100;
    /// Buffer size for audio streams
    pub const BUFFER_SIZE: cpal::BufferSize = cpal::BufferSize::Default;
    /// Channel captured when none is given
    pub const DEFAULT_CHANNEL: usize = 0;
}

/// Synthetic audio source
pub mod mock {
    use std::time::Duration;

    /// Frames per generated block
    pub const FRAME_COUNT: usize = 1024;
    /// Wall-clock delay between blocks (~60 blocks per second)
    pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);
    /// Waveform time advanced per block
    pub const TIME_STEP: f64 = 1.0 / 60.0;
    /// Frequency of the rectified sine envelope in Hz
    pub const FREQUENCY_HZ: f64 = 0.5;
    /// Scale from envelope to sample amplitude
    pub const AMPLITUDE: f64 = 0.1;
}
