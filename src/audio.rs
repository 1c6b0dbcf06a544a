//! Audio device handling and stream processing

use crate::error::{AppError, AppResult};
use crate::estimator::PcmBuffer;
use crate::pipeline::BlockSender;
use cpal::traits::{DeviceTrait, HostTrait};
use tracing::error;

/// Audio configuration and device information
pub struct AudioConfig {
    pub device_name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioConfig {
    /// Stream settings for capturing with this configuration
    pub fn stream_config(&self) -> cpal::StreamConfig {
        cpal::StreamConfig {
            channels: self.channels,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: crate::constants::audio::BUFFER_SIZE,
        }
    }
}

/// Find and configure an audio input device
pub fn setup_audio_device(device_name: Option<String>) -> AppResult<(cpal::Device, AudioConfig)> {
    let host = cpal::default_host();

    let device = if let Some(name) = device_name {
        host.input_devices()?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| AppError::AudioDevice(format!("Device '{}' not found", name)))?
    } else {
        host.default_input_device()
            .ok_or_else(|| AppError::AudioDevice("No default input device available".to_string()))?
    };

    let device_name = device.name()?;

    let mut supported_configs = device.supported_input_configs()?;
    let config_range = supported_configs
        .next()
        .ok_or_else(|| AppError::AudioDevice("No supported input configs found".to_string()))?;

    let preferred = crate::constants::audio::PREFERRED_SAMPLE_RATE;
    let sample_rate = if config_range.min_sample_rate().0 <= preferred
        && config_range.max_sample_rate().0 >= preferred
    {
        preferred
    } else {
        config_range.min_sample_rate().0
    };

    let audio_config = AudioConfig {
        device_name,
        sample_rate,
        channels: config_range.channels(),
    };

    Ok((device, audio_config))
}

/// Build an audio input stream with the given callback
pub fn build_audio_stream<F>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    data_callback: F,
) -> AppResult<cpal::Stream>
where
    F: FnMut(&[f32], &cpal::InputCallbackInfo) + Send + 'static,
{
    let stream = device.build_input_stream(
        config,
        data_callback,
        |err| error!("Audio stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

/// Pull one channel out of interleaved samples.
///
/// Returns `None` when the frame has no such channel.
pub fn extract_channel(data: &[f32], channel: usize, channels: u16) -> Option<Vec<f32>> {
    let channels = usize::from(channels);
    if channel >= channels {
        return None;
    }

    Some(
        data.chunks_exact(channels)
            .map(|frame| frame[channel])
            .collect(),
    )
}

/// Audio callback that hands the selected channel of each buffer to the pipeline
pub fn create_block_callback(
    sink: BlockSender,
    channel: usize,
    channels: u16,
) -> impl FnMut(&[f32], &cpal::InputCallbackInfo) + Send + 'static {
    move |data: &[f32], _: &cpal::InputCallbackInfo| {
        let frames = data.len() / usize::from(channels.max(1));
        let buffer = match extract_channel(data, channel, channels) {
            Some(samples) => PcmBuffer::new(samples),
            None => PcmBuffer::unavailable(frames),
        };
        sink.send(buffer).ok();
    }
}
