//! Streaming audio level estimation
//!
//! Converts mono f32 blocks into one perceptually scaled level in [0, 1] per
//! block, tracking an adaptive noise floor and a peak reference on the way.

use crate::config::EstimatorConfig;
use crate::constants::{diagnostics, stream::LEVEL_CHANNEL_CAPACITY};
use crate::error::LevelDiagnostic;
use crate::stream::LevelStream;
use crate::throttle::LogThrottle;
use std::time::Instant;
use tracing::warn;

/// Borrowed view of one block of mono samples
#[derive(Debug, Clone, Copy)]
pub struct AudioBlock<'a> {
    frame_length: usize,
    channel_data: Option<&'a [f32]>,
}

impl<'a> AudioBlock<'a> {
    /// A readable block covering all of `samples`
    pub fn new(samples: &'a [f32]) -> Self {
        Self {
            frame_length: samples.len(),
            channel_data: Some(samples),
        }
    }

    /// A block that declares `frame_length` frames but carries no sample data
    pub fn unavailable(frame_length: usize) -> Self {
        Self {
            frame_length,
            channel_data: None,
        }
    }

    /// A block from a declared length and optional data.
    ///
    /// Data shorter than the declared length cannot be read and is treated as
    /// unavailable; longer data is truncated to the declared length.
    pub fn from_parts(frame_length: usize, channel_data: Option<&'a [f32]>) -> Self {
        Self {
            frame_length,
            channel_data: channel_data.filter(|data| data.len() >= frame_length),
        }
    }

    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    pub fn is_empty(&self) -> bool {
        self.frame_length == 0
    }

    /// The readable samples, if any
    pub fn samples(&self) -> Option<&'a [f32]> {
        self.channel_data.map(|data| &data[..self.frame_length])
    }
}

/// Owned block used to hand samples across threads
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    frame_length: usize,
    channel_data: Option<Vec<f32>>,
}

impl PcmBuffer {
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            frame_length: samples.len(),
            channel_data: Some(samples),
        }
    }

    pub fn unavailable(frame_length: usize) -> Self {
        Self {
            frame_length,
            channel_data: None,
        }
    }

    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    pub fn as_block(&self) -> AudioBlock<'_> {
        AudioBlock::from_parts(self.frame_length, self.channel_data.as_deref())
    }
}

/// Adaptive state carried from block to block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorState {
    /// Estimated energy of ambient silence (RMS units)
    pub baseline_noise_level: f32,
    /// Highest recent RMS with slow release
    pub peak_level: f32,
}

impl EstimatorState {
    fn from_config(config: &EstimatorConfig) -> Self {
        Self {
            baseline_noise_level: config.initial_baseline_noise,
            peak_level: config.initial_peak,
        }
    }
}

/// Counters describing what the estimator did with its input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EstimatorStats {
    pub blocks_processed: u64,
    pub levels_emitted: u64,
    pub empty_blocks: u64,
    pub unavailable_blocks: u64,
    pub dropped_levels: u64,
    pub numeric_anomalies: u64,
}

impl EstimatorStats {
    fn record(&mut self, diagnostic: LevelDiagnostic) {
        match diagnostic {
            LevelDiagnostic::EmptyBlock => self.empty_blocks += 1,
            LevelDiagnostic::UnavailableSampleData => self.unavailable_blocks += 1,
            LevelDiagnostic::NoActiveConsumer => self.dropped_levels += 1,
            LevelDiagnostic::NumericAnomaly => self.numeric_anomalies += 1,
        }
    }
}

/// Single-writer level estimator.
///
/// All mutation goes through `&mut self`; callers must funnel blocks through
/// one owner in arrival order (see [`crate::pipeline::LevelPipeline`]).
#[derive(Debug)]
pub struct AudioLevelEstimator {
    config: EstimatorConfig,
    state: EstimatorState,
    stats: EstimatorStats,
    level_stream: Option<LevelStream>,
    no_consumer_throttle: LogThrottle,
    unavailable_data_throttle: LogThrottle,
}

impl Default for AudioLevelEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioLevelEstimator {
    /// Create an estimator with the default tuning
    pub fn new() -> Self {
        Self::with_config(EstimatorConfig::default())
    }

    pub fn with_config(config: EstimatorConfig) -> Self {
        Self {
            state: EstimatorState::from_config(&config),
            config,
            stats: EstimatorStats::default(),
            level_stream: None,
            no_consumer_throttle: LogThrottle::new(diagnostics::NO_CONSUMER_LOG_INTERVAL),
            unavailable_data_throttle: LogThrottle::new(diagnostics::UNAVAILABLE_DATA_LOG_INTERVAL),
        }
    }

    /// Handle to this estimator's output, created on first use
    pub fn level_stream(&mut self) -> LevelStream {
        self.level_stream
            .get_or_insert_with(|| LevelStream::new(LEVEL_CHANNEL_CAPACITY))
            .clone()
    }

    pub fn state(&self) -> EstimatorState {
        self.state
    }

    pub fn stats(&self) -> EstimatorStats {
        self.stats
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Consume one block and publish its level.
    ///
    /// Never fails: empty blocks and blocks without readable data are ignored,
    /// and levels nobody is listening for are dropped.
    pub fn process_block(&mut self, block: AudioBlock<'_>) {
        self.process_block_at(block, Instant::now());
    }

    fn process_block_at(&mut self, block: AudioBlock<'_>, now: Instant) {
        if block.is_empty() {
            self.stats.record(LevelDiagnostic::EmptyBlock);
            return;
        }

        let Some(samples) = block.samples() else {
            self.stats.record(LevelDiagnostic::UnavailableSampleData);
            if self.unavailable_data_throttle.should_log_at(now) {
                warn!(
                    frame_length = block.frame_length(),
                    "{}",
                    LevelDiagnostic::UnavailableSampleData
                );
            }
            return;
        };

        let rms = self.calculate_rms(samples);
        self.update_adaptive_levels(rms);
        let level = self.enhance_level(self.normalize_level(rms));
        self.stats.blocks_processed += 1;
        self.emit(level, now);
    }

    fn emit(&mut self, level: f64, now: Instant) {
        let delivered = self
            .level_stream
            .as_ref()
            .is_some_and(|stream| stream.publish(level));

        if delivered {
            self.stats.levels_emitted += 1;
            return;
        }

        self.stats.record(LevelDiagnostic::NoActiveConsumer);
        if self.no_consumer_throttle.should_log_at(now) {
            warn!("{}", LevelDiagnostic::NoActiveConsumer);
        }
    }

    fn calculate_rms(&mut self, samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }

        let sum: f32 = samples.iter().map(|s| s * s).sum();
        let mean_square = sum / samples.len() as f32;
        if !mean_square.is_finite() || mean_square < 0.0 {
            self.stats.record(LevelDiagnostic::NumericAnomaly);
            return 0.0;
        }

        mean_square.sqrt()
    }

    fn update_adaptive_levels(&mut self, rms: f32) {
        let config = &self.config;
        let state = &mut self.state;

        if rms < state.baseline_noise_level * config.noise_gate_ratio {
            let adapted = state.baseline_noise_level * (1.0 - config.noise_smoothing)
                + rms * config.noise_smoothing;
            state.baseline_noise_level = adapted.min(config.baseline_cap);
        }

        // Tracked for headroom only; normalization below does not read it.
        if rms > state.peak_level {
            state.peak_level = rms;
        } else {
            state.peak_level =
                state.peak_level * config.peak_release + rms * (1.0 - config.peak_release);
        }
    }

    fn normalize_level(&self, rms: f32) -> f64 {
        let amplified = rms * self.config.gain;
        f64::from(amplified.min(1.0).max(0.0))
    }

    fn enhance_level(&self, raw_level: f64) -> f64 {
        raw_level.clamp(0.0, 1.0).powf(self.config.exponent)
    }
}
