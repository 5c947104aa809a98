use crate::AppResult;

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, info, instrument};

/// 16-bit PCM WAV file receiving captured samples.
///
/// Every [`flush`](Self::flush) rewrites the header, so the file on disk is a
/// playable WAV up to the last checkpoint even if the process dies.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    path: PathBuf,
    spec: WavSpec,
    samples_written: u64,
}

impl WavSink {
    /// Creates `path` for interleaved audio with the given layout.
    #[track_caller]
    #[instrument]
    pub(crate) fn create(path: &Path, sample_rate: u32, channels: u16) -> AppResult<Self> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let writer = WavWriter::create(path, spec)?;

        debug!(path = ?path, "WAV sink created");

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            spec,
            samples_written: 0,
        })
    }

    /// Appends interleaved `f32` samples, clamped to `[-1.0, 1.0]`.
    #[track_caller]
    pub(crate) fn write_samples(&mut self, samples: &[f32]) -> AppResult<()> {
        for &sample in samples {
            let scaled = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
            self.writer.write_sample(scaled)?;
        }
        self.samples_written += samples.len() as u64;
        Ok(())
    }

    /// Writes buffered data and a valid header. Returns seconds written.
    #[track_caller]
    pub(crate) fn flush(&mut self) -> AppResult<f64> {
        self.writer.flush()?;
        Ok(self.duration())
    }

    /// Seconds of audio written so far.
    pub(crate) fn duration(&self) -> f64 {
        frames_to_secs(self.samples_written, self.spec)
    }

    /// File being written.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Finalizes the header and closes the file. Returns seconds written.
    #[track_caller]
    #[instrument(skip(self), fields(path = ?self.path))]
    pub(crate) fn finalize(self) -> AppResult<f64> {
        let duration = self.duration();
        self.writer.finalize()?;
        info!(duration_secs = duration, "WAV file finalized");
        Ok(duration)
    }

    /// Reads the playable length of a WAV left behind by a crash.
    ///
    /// Audio after the last checkpoint is not covered by the header and is
    /// not counted.
    #[track_caller]
    #[instrument]
    pub(crate) fn recover(path: &Path) -> AppResult<f64> {
        let reader = WavReader::open(path)?;
        let spec = reader.spec();
        let samples = u64::from(reader.len());
        let duration = frames_to_secs(samples, spec);

        info!(duration_secs = duration, "WAV file recovered");

        Ok(duration)
    }
}

fn frames_to_secs(samples: u64, spec: WavSpec) -> f64 {
    let per_second = f64::from(spec.sample_rate) * f64::from(spec.channels);
    if per_second > 0.0 {
        samples as f64 / per_second
    } else {
        0.0
    }
}
