//! Synthetic audio source for demos and hardware-free runs

use crate::constants::mock;
use crate::estimator::PcmBuffer;
use crate::pipeline::BlockSender;
use std::f64::consts::PI;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Emits constant-valued blocks following a rectified sine envelope
#[derive(Debug, Clone)]
pub struct MockAudioProvider {
    pub frame_count: usize,
    pub frame_interval: Duration,
    pub time_step: f64,
    pub frequency_hz: f64,
    pub amplitude: f64,
}

impl Default for MockAudioProvider {
    fn default() -> Self {
        Self {
            frame_count: mock::FRAME_COUNT,
            frame_interval: mock::FRAME_INTERVAL,
            time_step: mock::TIME_STEP,
            frequency_hz: mock::FREQUENCY_HZ,
            amplitude: mock::AMPLITUDE,
        }
    }
}

impl MockAudioProvider {
    /// Envelope value in [0, 1] at `time` seconds
    pub fn envelope_at(&self, time: f64) -> f64 {
        (time * 2.0 * PI * self.frequency_hz).sin().abs()
    }

    /// The block generated at `time` seconds
    pub fn buffer_at(&self, time: f64) -> PcmBuffer {
        let sample = (self.envelope_at(time) * self.amplitude) as f32;
        PcmBuffer::new(vec![sample; self.frame_count])
    }

    /// Generate blocks into `sink` until it closes
    pub fn spawn(self, sink: BlockSender) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut time = 0.0;
            debug!(frame_count = self.frame_count, "mock audio provider started");

            loop {
                if sink.send(self.buffer_at(time)).is_err() {
                    break;
                }
                time += self.time_step;
                tokio::time::sleep(self.frame_interval).await;
            }

            debug!("mock audio provider stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EstimatorConfig;
    use crate::pipeline::LevelPipeline;

    #[test]
    fn test_envelope_shape() {
        let provider = MockAudioProvider::default();
        assert!(provider.envelope_at(0.0).abs() < 1e-12);
        // Quarter period of a 0.5 Hz sine
        assert!((provider.envelope_at(0.5) - 1.0).abs() < 1e-12);
        assert!(provider.envelope_at(1.0) < 1e-9);
        // Rectified: second half of the period stays positive
        assert!((provider.envelope_at(1.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_buffer_is_constant_and_scaled() {
        let provider = MockAudioProvider::default();
        let buffer = provider.buffer_at(0.5);
        assert_eq!(buffer.frame_length(), 1024);

        let samples = buffer.as_block().samples().unwrap();
        assert!(samples.iter().all(|&s| (s - 0.1).abs() < 1e-6));
    }

    #[tokio::test]
    async fn test_feeds_pipeline_until_closed() {
        let pipeline = LevelPipeline::spawn(EstimatorConfig::default());
        let mut receiver = pipeline.levels().subscribe();
        let provider = MockAudioProvider {
            frame_interval: Duration::from_millis(1),
            ..MockAudioProvider::default()
        };
        let producer = provider.spawn(pipeline.blocks());

        // First block is silent, later ones rise with the envelope
        assert_eq!(receiver.recv().await, Some(0.0));
        let next = receiver.recv().await.unwrap();
        assert!(next > 0.0 && next <= 1.0);

        producer.abort();
        producer.await.ok();
        let stats = pipeline.shutdown().await.unwrap();
        assert!(stats.blocks_processed >= 2);
    }
}
