use crate::{AudioFormat, RecordingServiceError};

/// WHAT: Each format's extension equals its tag
/// WHY: Exported audio files are named by extension
#[test]
fn given_every_format_when_reading_extension_then_equals_tag() {
    for format in AudioFormat::ALL {
        assert_eq!(format.file_extension(), format.as_str());
        assert_eq!(format.to_string(), format.as_str());
    }
}

/// WHAT: Tags parse case-insensitively with an optional dot
/// WHY: Users type formats on the command line
#[test]
fn given_tags_when_parsing_then_formats_resolved() {
    assert_eq!("wav".parse::<AudioFormat>().unwrap(), AudioFormat::Wav);
    assert_eq!("M4A".parse::<AudioFormat>().unwrap(), AudioFormat::M4a);
    assert_eq!(".mp3".parse::<AudioFormat>().unwrap(), AudioFormat::Mp3);
}

/// WHAT: Unknown tags are rejected as unsupported formats
/// WHY: The error names the format the user asked for
#[test]
fn given_unknown_tag_when_parsing_then_format_not_supported() {
    let result = "flac".parse::<AudioFormat>();

    match result {
        Err(RecordingServiceError::FormatNotSupported { format, .. }) => {
            assert_eq!(format, "flac")
        }
        other => panic!("expected FormatNotSupported, got {other:?}"),
    }
}
