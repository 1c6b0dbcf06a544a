//! Custom error types for the application

use std::fmt;
use thiserror::Error;

/// Application-specific error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Audio device related errors
    #[error("Audio device error: {0}")]
    AudioDevice(String),
    /// Audio stream related errors
    #[error("Audio stream error: {0}")]
    AudioStream(String),
    /// Invalid command line or estimator configuration
    #[error("Configuration error: {0}")]
    Config(String),
    /// The level pipeline no longer accepts blocks
    #[error("Level pipeline is closed")]
    PipelineClosed,
    /// The level pipeline task failed
    #[error("Level pipeline error: {0}")]
    Pipeline(String),
    /// Interactive prompt failures
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl From<cpal::DevicesError> for AppError {
    fn from(err: cpal::DevicesError) -> Self {
        AppError::AudioDevice(format!("Failed to enumerate devices: {}", err))
    }
}

impl From<cpal::DeviceNameError> for AppError {
    fn from(err: cpal::DeviceNameError) -> Self {
        AppError::AudioDevice(format!("Failed to get device name: {}", err))
    }
}

impl From<cpal::SupportedStreamConfigsError> for AppError {
    fn from(err: cpal::SupportedStreamConfigsError) -> Self {
        AppError::AudioDevice(format!("Failed to get supported stream configs: {}", err))
    }
}

impl From<cpal::BuildStreamError> for AppError {
    fn from(err: cpal::BuildStreamError) -> Self {
        AppError::AudioStream(format!("Failed to build audio stream: {}", err))
    }
}

impl From<cpal::PlayStreamError> for AppError {
    fn from(err: cpal::PlayStreamError) -> Self {
        AppError::AudioStream(format!("Failed to play audio stream: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Pipeline(format!("Estimator task stopped abnormally: {}", err))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Degenerate conditions the estimator absorbs without failing the caller.
///
/// These are never returned from block processing; they select a counter and,
/// for the throttled categories, a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelDiagnostic {
    /// Zero-length block
    EmptyBlock,
    /// Block declares frames but its sample data cannot be read
    UnavailableSampleData,
    /// A level was computed but nobody is listening
    NoActiveConsumer,
    /// Mean-square energy came out negative or non-finite
    NumericAnomaly,
}

impl fmt::Display for LevelDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelDiagnostic::EmptyBlock => write!(f, "empty audio block"),
            LevelDiagnostic::UnavailableSampleData => write!(f, "no channel data in audio block"),
            LevelDiagnostic::NoActiveConsumer => write!(f, "no level consumer, dropping level"),
            LevelDiagnostic::NumericAnomaly => write!(f, "invalid mean-square energy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AppError::Config("Gain must be positive".to_string());
        assert_eq!(err.to_string(), "Configuration error: Gain must be positive");
        assert_eq!(AppError::PipelineClosed.to_string(), "Level pipeline is closed");
    }

    #[test]
    fn test_diagnostic_display() {
        assert_eq!(
            LevelDiagnostic::UnavailableSampleData.to_string(),
            "no channel data in audio block"
        );
    }
}
