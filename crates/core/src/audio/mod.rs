use std::path::{Path, PathBuf};

use crate::{BeatlineError, Result};

/// One loaded audio source: file identity plus decoded per-channel float
/// amplitudes. Exclusively owned by the session and replaced wholesale on a
/// new file load or reset.
#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub path: PathBuf,
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
    pub duration_seconds: f64,
}

impl Track {
    /// Decodes a WAV file into per-channel f32 amplitudes. Any decode
    /// problem is surfaced as a terminal error for this load attempt; the
    /// caller keeps its previous state.
    pub fn from_wav(path: &Path) -> Result<Self> {
        let reader =
            hound::WavReader::open(path).map_err(|err| BeatlineError::Decode(err.to_string()))?;
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(BeatlineError::Decode("file reports zero channels".into()));
        }

        let interleaved = decode_samples(reader)?;
        if interleaved.is_empty() {
            return Err(BeatlineError::Decode("file contains no samples".into()));
        }

        let channel_count = spec.channels as usize;
        let mut channels: Vec<Vec<f32>> = (0..channel_count)
            .map(|_| Vec::with_capacity(interleaved.len() / channel_count))
            .collect();
        for (index, sample) in interleaved.into_iter().enumerate() {
            channels[index % channel_count].push(sample);
        }

        let frames = channels[0].len();
        let duration_seconds = frames as f64 / spec.sample_rate as f64;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            path: path.to_path_buf(),
            channels,
            sample_rate: spec.sample_rate,
            duration_seconds,
        })
    }

    /// The channel the waveform layer draws; the first one by convention.
    pub fn primary_channel(&self) -> &[f32] {
        &self.channels[0]
    }
}

fn decode_samples(mut reader: hound::WavReader<std::io::BufReader<std::fs::File>>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let decode_err = |err: hound::Error| BeatlineError::Decode(err.to_string());
    match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map_err(decode_err))
            .collect(),
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map_err(decode_err).map(|v| v as f32 / scale))
                .collect()
        }
    }
}
