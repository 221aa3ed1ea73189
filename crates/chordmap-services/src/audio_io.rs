//! Audio output device access

use std::path::Path;
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum AudioOutputError {
    #[error("No audio output devices found")]
    NoDevices,
    #[error("Failed to get default output config: {0}")]
    ConfigError(String),
    #[error("Failed to build output stream: {0}")]
    StreamError(String),
    #[error("Failed to write WAV file: {0}")]
    WavError(String),
}

/// Name, sample rate and channel count of an output device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Anything the output stream can pull interleaved samples from.
///
/// Called on the audio thread; implementations do their own locking.
pub trait SampleSource: Send + Sync + 'static {
    fn fill_buffer(&self, buffer: &mut [f32], sample_rate: u32, channels: u16);
}

fn default_output() -> Result<(cpal::Device, cpal::SupportedStreamConfig), AudioOutputError> {
    let device = cpal::default_host()
        .default_output_device()
        .ok_or(AudioOutputError::NoDevices)?;
    let config = device
        .default_output_config()
        .map_err(|e| AudioOutputError::ConfigError(e.to_string()))?;
    Ok((device, config))
}

fn device_info(device: &cpal::Device, config: &cpal::SupportedStreamConfig) -> OutputDeviceInfo {
    OutputDeviceInfo {
        name: device.name().unwrap_or_default(),
        sample_rate: config.sample_rate().0,
        channels: config.channels(),
    }
}

pub struct AudioOutputService;

impl AudioOutputService {
    /// Get default output device info
    pub fn default_device_info() -> Result<OutputDeviceInfo, AudioOutputError> {
        let (device, config) = default_output()?;
        Ok(device_info(&device, &config))
    }

    /// Names of every output device on the default host
    pub fn output_device_names() -> Result<Vec<String>, AudioOutputError> {
        let devices = cpal::default_host()
            .output_devices()
            .map_err(|e| AudioOutputError::ConfigError(e.to_string()))?;

        Ok(devices.filter_map(|d| d.name().ok()).collect())
    }

    /// Write mono f32 samples as a 32-bit float WAV file
    pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), AudioOutputError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let mut writer = hound::WavWriter::create(path, spec)
            .map_err(|e| AudioOutputError::WavError(e.to_string()))?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| AudioOutputError::WavError(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| AudioOutputError::WavError(e.to_string()))?;

        info!(path = %path.display(), samples = samples.len(), sample_rate, "Wrote WAV file");
        Ok(())
    }
}

/// Stream on the default output device, pulling from a shared `SampleSource`.
///
/// Runs at the device's own rate and channel count. Dropping it closes the device.
pub struct RealtimeOutputStream {
    device: OutputDeviceInfo,
    stream: cpal::Stream,
}

impl RealtimeOutputStream {
    pub fn start<S: SampleSource>(source: Arc<S>) -> Result<Self, AudioOutputError> {
        let (device, supported_config) = default_output()?;
        let info = device_info(&device, &supported_config);

        let sample_rate = info.sample_rate;
        let channels = info.channels;
        let config: StreamConfig = supported_config.into();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    source.fill_buffer(data, sample_rate, channels);
                },
                move |err| error!("Output stream error: {}", err),
                None,
            )
            .map_err(|e| AudioOutputError::StreamError(e.to_string()))?;

        stream.play().map_err(|e| AudioOutputError::StreamError(e.to_string()))?;

        info!(device = %info.name, sample_rate, channels, "Started realtime output stream");
        Ok(Self { device: info, stream })
    }

    /// Device the stream plays on
    pub fn device(&self) -> &OutputDeviceInfo {
        &self.device
    }

    /// Pause and close the stream
    pub fn stop(self) {
        if let Err(e) = self.stream.pause() {
            warn!(device = %self.device.name, "Failed to pause output stream: {}", e);
        }
        debug!(device = %self.device.name, "Output stream closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_wav_reads_back() {
        let path = std::env::temp_dir().join(format!("chordmap-wav-{}.wav", std::process::id()));
        let samples: Vec<f32> = (0..400).map(|i| (i as f32 / 400.0) - 0.5).collect();

        AudioOutputService::write_wav(&path, &samples, 8000).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(spec.sample_format, hound::SampleFormat::Float);
        let read: Vec<f32> = reader.samples::<f32>().filter_map(Result::ok).collect();
        assert_eq!(read, samples);

        let _ = std::fs::remove_file(&path);
    }
}
