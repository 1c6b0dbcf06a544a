//! Configuration parsing and validation

use crate::constants;
use crate::error::{AppError, AppResult};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::time::Duration;

/// Command line arguments for the soundpulse application
#[derive(Parser)]
#[command(name = "soundpulse")]
#[command(about = "Live audio level estimation for pulse meters")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate levels from a microphone and print them
    Monitor(MonitorArgs),
    /// Estimate levels from a synthetic sine envelope and print them
    Simulate(SimulateArgs),
    /// List available audio input devices
    List(ListArgs),
}

/// Options shared by every level-producing command
#[derive(ClapArgs, Clone)]
pub struct LevelArgs {
    /// Monitoring duration in seconds (optional, runs until Ctrl+C if not specified)
    #[arg(long)]
    pub seconds: Option<f32>,

    /// Linear gain applied to block RMS before clamping
    #[arg(long, default_value_t = constants::estimator::GAIN)]
    pub gain: f32,

    /// Power-law exponent used to lift quiet levels
    #[arg(long, default_value_t = constants::estimator::EXPONENT)]
    pub exponent: f64,

    /// Output only the level values without labels or summary
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Parser)]
pub struct MonitorArgs {
    /// Audio input device name (optional, uses default if not specified)
    #[arg(long)]
    pub device: Option<String>,

    /// Audio channel to monitor
    #[arg(long, default_value_t = constants::audio::DEFAULT_CHANNEL)]
    pub channel: usize,

    #[command(flatten)]
    pub level: LevelArgs,
}

#[derive(Parser)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub level: LevelArgs,
}

#[derive(Parser)]
pub struct ListArgs {}

/// Tuning for [`crate::estimator::AudioLevelEstimator`]
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    pub initial_baseline_noise: f32,
    pub initial_peak: f32,
    /// Blocks quieter than baseline times this ratio adapt the baseline
    pub noise_gate_ratio: f32,
    pub noise_smoothing: f32,
    pub baseline_cap: f32,
    pub peak_release: f32,
    pub gain: f32,
    pub exponent: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        use constants::estimator::*;

        Self {
            initial_baseline_noise: INITIAL_BASELINE_NOISE,
            initial_peak: INITIAL_PEAK,
            noise_gate_ratio: NOISE_GATE_RATIO,
            noise_smoothing: NOISE_SMOOTHING,
            baseline_cap: BASELINE_CAP,
            peak_release: PEAK_RELEASE,
            gain: GAIN,
            exponent: EXPONENT,
        }
    }
}

impl EstimatorConfig {
    /// Reject values that would make levels meaningless
    pub fn validate(&self) -> AppResult<()> {
        let positive = [
            ("Initial baseline", self.initial_baseline_noise),
            ("Initial peak", self.initial_peak),
            ("Noise gate ratio", self.noise_gate_ratio),
            ("Baseline cap", self.baseline_cap),
            ("Gain", self.gain),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(AppError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        if !self.exponent.is_finite() || self.exponent <= 0.0 {
            return Err(AppError::Config(format!(
                "Exponent must be a positive number, got {}",
                self.exponent
            )));
        }

        for (name, value) in [
            ("Noise smoothing", self.noise_smoothing),
            ("Peak release", self.peak_release),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(AppError::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Where audio blocks come from
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    Microphone {
        device_name: Option<String>,
        channel: usize,
    },
    Mock,
}

/// Session configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceConfig,
    pub estimator: EstimatorConfig,
    /// How long to monitor; `None` runs until Ctrl+C
    pub duration: Option<Duration>,
    pub quiet: bool,
}

impl Config {
    /// Create configuration from monitor arguments
    pub fn from_monitor_args(monitor_args: MonitorArgs) -> AppResult<Self> {
        Self::from_level_args(
            SourceConfig::Microphone {
                device_name: monitor_args.device,
                channel: monitor_args.channel,
            },
            monitor_args.level,
        )
    }

    /// Create configuration from simulate arguments
    pub fn from_simulate_args(simulate_args: SimulateArgs) -> AppResult<Self> {
        Self::from_level_args(SourceConfig::Mock, simulate_args.level)
    }

    fn from_level_args(source: SourceConfig, level_args: LevelArgs) -> AppResult<Self> {
        let duration = level_args
            .seconds
            .map(session_duration)
            .transpose()?;

        let estimator = EstimatorConfig {
            gain: level_args.gain,
            exponent: level_args.exponent,
            ..EstimatorConfig::default()
        };
        estimator.validate()?;

        Ok(Config {
            source,
            estimator,
            duration,
            quiet: level_args.quiet,
        })
    }
}

/// Convert a `--seconds` value into a session length
fn session_duration(seconds: f32) -> AppResult<Duration> {
    if !(seconds > 0.0) {
        return Err(AppError::Config("Seconds must be positive".to_string()));
    }

    Duration::try_from_secs_f32(seconds).map_err(|_| {
        AppError::Config(format!("Seconds value {} is too large", seconds))
    })
}
