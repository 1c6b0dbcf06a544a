//! Live audio level estimation for pulsing microphone meters.
//!
//! Blocks of mono f32 samples go in through [`pipeline::LevelPipeline`] (or
//! directly into [`estimator::AudioLevelEstimator`]); perceptually scaled
//! levels in [0, 1] come out on a [`stream::LevelStream`].

pub mod app;
pub mod audio;
pub mod config;
pub mod constants;
pub mod error;
pub mod estimator;
pub mod mock;
pub mod pipeline;
pub mod stream;
pub mod summary;
pub mod throttle;

pub use config::EstimatorConfig;
pub use error::{AppError, AppResult, LevelDiagnostic};
pub use estimator::{AudioBlock, AudioLevelEstimator, EstimatorState, EstimatorStats, PcmBuffer};
pub use pipeline::{BlockSender, LevelPipeline};
pub use stream::{LevelReceiver, LevelStream};
