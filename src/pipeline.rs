//! Single-owner processing task for the level estimator

use crate::config::EstimatorConfig;
use crate::error::{AppError, AppResult};
use crate::estimator::{AudioLevelEstimator, EstimatorStats, PcmBuffer};
use crate::stream::LevelStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Producer side of a [`LevelPipeline`].
///
/// Sending never blocks, so it is safe to call from an audio callback.
#[derive(Debug, Clone)]
pub struct BlockSender {
    sender: mpsc::UnboundedSender<PcmBuffer>,
}

impl BlockSender {
    /// Queue a block for estimation
    pub fn send(&self, buffer: PcmBuffer) -> AppResult<()> {
        self.sender
            .send(buffer)
            .map_err(|_| AppError::PipelineClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// A spawned task that owns an estimator and feeds it blocks in arrival order
pub struct LevelPipeline {
    blocks: BlockSender,
    levels: LevelStream,
    task: JoinHandle<EstimatorStats>,
}

impl LevelPipeline {
    /// Start the estimator task on the current tokio runtime
    pub fn spawn(config: EstimatorConfig) -> Self {
        let mut estimator = AudioLevelEstimator::with_config(config);
        let levels = estimator.level_stream();
        let (sender, mut receiver) = mpsc::unbounded_channel::<PcmBuffer>();

        let task = tokio::spawn(async move {
            while let Some(buffer) = receiver.recv().await {
                estimator.process_block(buffer.as_block());
            }
            let stats = estimator.stats();
            debug!(?stats, "level estimator finished");
            stats
        });

        Self {
            blocks: BlockSender { sender },
            levels,
            task,
        }
    }

    /// A handle for producers; clone freely
    pub fn blocks(&self) -> BlockSender {
        self.blocks.clone()
    }

    /// The estimator's level stream
    pub fn levels(&self) -> LevelStream {
        self.levels.clone()
    }

    /// Stop accepting blocks from this handle and wait for the task to drain.
    ///
    /// The task ends once every [`BlockSender`] clone has been dropped.
    pub async fn shutdown(self) -> AppResult<EstimatorStats> {
        let LevelPipeline { blocks, task, .. } = self;
        drop(blocks);
        Ok(task.await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_levels_follow_block_order() {
        let pipeline = LevelPipeline::spawn(EstimatorConfig::default());
        let mut receiver = pipeline.levels().subscribe();
        let blocks = pipeline.blocks();

        blocks.send(PcmBuffer::new(vec![0.0; 256])).unwrap();
        blocks.send(PcmBuffer::new(vec![0.1; 256])).unwrap();
        blocks.send(PcmBuffer::new(vec![0.01; 256])).unwrap();

        assert_eq!(receiver.recv().await, Some(0.0));
        assert!((receiver.recv().await.unwrap() - 1.0).abs() < 1e-6);
        let quiet = receiver.recv().await.unwrap();
        assert!(quiet > 0.6 && quiet < 0.63);
    }

    #[tokio::test]
    async fn test_degenerate_blocks_emit_nothing() {
        let pipeline = LevelPipeline::spawn(EstimatorConfig::default());
        let mut receiver = pipeline.levels().subscribe();
        let blocks = pipeline.blocks();

        blocks.send(PcmBuffer::new(Vec::new())).unwrap();
        blocks.send(PcmBuffer::unavailable(512)).unwrap();
        blocks.send(PcmBuffer::new(vec![0.1; 64])).unwrap();

        // The first level out belongs to the only valid block
        assert!((receiver.recv().await.unwrap() - 1.0).abs() < 1e-6);

        drop(blocks);
        let stats = pipeline.shutdown().await.unwrap();
        assert_eq!(stats.empty_blocks, 1);
        assert_eq!(stats.unavailable_blocks, 1);
        assert_eq!(stats.blocks_processed, 1);
        assert_eq!(stats.levels_emitted, 1);
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue_and_closes_stream() {
        let pipeline = LevelPipeline::spawn(EstimatorConfig::default());
        let mut receiver = pipeline.levels().subscribe();
        let blocks = pipeline.blocks();
        for _ in 0..10 {
            blocks.send(PcmBuffer::new(vec![0.05; 128])).unwrap();
        }
        drop(blocks);

        let stats = pipeline.shutdown().await.unwrap();
        assert_eq!(stats.blocks_processed, 10);

        let mut received = 0;
        while receiver.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(received, 10);
    }

    #[tokio::test]
    async fn test_closed_pipeline_rejects_blocks() {
        let (sender, receiver) = mpsc::unbounded_channel::<PcmBuffer>();
        drop(receiver);
        let blocks = BlockSender { sender };
        assert!(blocks.is_closed());
        assert!(matches!(
            blocks.send(PcmBuffer::new(vec![0.0; 4])),
            Err(AppError::PipelineClosed)
        ));
    }
}
