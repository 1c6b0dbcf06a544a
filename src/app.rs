//! Main application logic and orchestration

use crate::audio;
use crate::config::{Config, SourceConfig};
use crate::error::{AppError, AppResult};
use crate::mock::MockAudioProvider;
use crate::pipeline::{BlockSender, LevelPipeline};
use crate::summary::LevelSummary;
use cpal::traits::StreamTrait;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// Main application struct
pub struct App {
    config: Config,
}

/// Exit codes for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    UserExit = 1, // User pressed Ctrl+C
    Error = 2,    // Actual application error
}

/// Result type that includes user exit information
pub type AppRunResult = Result<LevelSummary, AppError>;

/// Extended result that tracks exit reason
pub struct RunResult {
    pub result: AppRunResult,
    pub exit_code: ExitCode,
}

impl RunResult {
    fn error(err: AppError) -> Self {
        RunResult {
            result: Err(err),
            exit_code: ExitCode::Error,
        }
    }
}

/// A running block producer; dropping or stopping it ends block delivery
enum BlockSource {
    Microphone(cpal::Stream),
    Mock(JoinHandle<()>),
}

impl BlockSource {
    async fn stop(self) {
        match self {
            BlockSource::Microphone(stream) => drop(stream),
            BlockSource::Mock(handle) => {
                handle.abort();
                handle.await.ok();
            }
        }
    }
}

impl App {
    pub fn new(config: Config) -> Self {
        App { config }
    }

    /// Run a monitoring session until the deadline, Ctrl+C, or the stream ends
    pub async fn run(self) -> RunResult {
        let pipeline = LevelPipeline::spawn(self.config.estimator.clone());
        let mut levels = pipeline.levels().subscribe();

        let source = match self.start_source(pipeline.blocks()) {
            Ok(source) => source,
            Err(e) => return RunResult::error(e),
        };

        let deadline = self
            .config
            .duration
            .map(|duration| Instant::now() + duration);
        let until_deadline = wait_until(deadline);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(until_deadline, ctrl_c);

        let mut summary = LevelSummary::new();
        let exit_code = loop {
            tokio::select! {
                _ = &mut ctrl_c => break ExitCode::UserExit,
                _ = &mut until_deadline => break ExitCode::Success,
                level = levels.recv() => match level {
                    Some(level) => {
                        summary.record(level);
                        self.print_level(level);
                    }
                    None => break ExitCode::Success,
                },
            }
        };

        // Cleanup - stop producing before draining the estimator
        source.stop().await;
        match pipeline.shutdown().await {
            Ok(stats) => info!(
                blocks = stats.blocks_processed,
                emitted = stats.levels_emitted,
                dropped = stats.dropped_levels,
                "session finished"
            ),
            Err(e) => return RunResult::error(e),
        }

        RunResult {
            result: Ok(summary),
            exit_code,
        }
    }

    fn start_source(&self, sink: BlockSender) -> AppResult<BlockSource> {
        match &self.config.source {
            SourceConfig::Microphone {
                device_name,
                channel,
            } => {
                let (device, audio_config) = audio::setup_audio_device(device_name.clone())?;
                if *channel >= usize::from(audio_config.channels) {
                    return Err(AppError::Config(format!(
                        "Channel {} not available, '{}' has {} channel(s)",
                        channel, audio_config.device_name, audio_config.channels
                    )));
                }

                let callback =
                    audio::create_block_callback(sink, *channel, audio_config.channels);
                let stream =
                    audio::build_audio_stream(&device, &audio_config.stream_config(), callback)?;
                stream.play()?;

                info!(
                    device = %audio_config.device_name,
                    sample_rate = audio_config.sample_rate,
                    channel,
                    "monitoring microphone"
                );
                Ok(BlockSource::Microphone(stream))
            }
            SourceConfig::Mock => {
                let provider = MockAudioProvider::default();
                debug!(?provider, "starting mock audio provider");
                info!("monitoring simulated input");
                Ok(BlockSource::Mock(provider.spawn(sink)))
            }
        }
    }

    fn print_level(&self, level: f64) {
        if self.config.quiet {
            println!("{:.4}", level);
        } else {
            println!("level {:.3}", level);
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EstimatorConfig;

    fn simulate_config(duration: Duration) -> Config {
        Config {
            source: SourceConfig::Mock,
            estimator: EstimatorConfig::default(),
            duration: Some(duration),
            quiet: true,
        }
    }

    #[tokio::test]
    async fn test_simulated_session_reaches_deadline() {
        let run = App::new(simulate_config(Duration::from_millis(200))).run().await;
        assert_eq!(run.exit_code, ExitCode::Success);

        let summary = run.result.unwrap();
        assert!(summary.count() > 0);
        let max = summary.max().unwrap();
        assert!((0.0..=1.0).contains(&max));
    }

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success as i32, 0);
        assert_eq!(ExitCode::UserExit as i32, 1);
        assert_eq!(ExitCode::Error as i32, 2);
    }
}
