mod audio_format;
mod message;
mod recording;
mod segment;
mod session;

pub use {
    audio_format::AudioFormat, message::ConversationMessage, recording::Recording,
    segment::Segment, session::Session,
};
