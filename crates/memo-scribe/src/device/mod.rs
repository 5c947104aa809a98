mod disk_space;
mod input_stream;
mod microphone;
pub(crate) mod sidecar;
mod wav_sink;

pub(crate) use {input_stream::InputStream, wav_sink::WavSink};

pub use microphone::MicrophoneDevice;

#[cfg(test)]
pub(crate) use {input_stream::device_failure, microphone::audio_engine};
