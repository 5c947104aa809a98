use crate::{
    BilingualOrder, ContentOption, SubtitleExportError, SubtitleExportOptions, SubtitleFormat,
};

/// WHAT: Defaults are SRT, both languages, timestamps, translation first
/// WHY: These defaults decide what a one-click export produces
#[test]
fn given_default_options_when_constructing_then_documented_defaults() {
    let options = SubtitleExportOptions::default();

    assert_eq!(options.format, SubtitleFormat::Srt);
    assert_eq!(options.content_option, ContentOption::Both);
    assert!(options.include_timestamps);
    assert_eq!(options.bilingual_order, BilingualOrder::TranslationFirst);
}

/// WHAT: Format tags parse case-insensitively with an optional dot
/// WHY: Users type formats on the command line
#[test]
fn given_format_tags_when_parsing_then_formats_resolved() {
    assert_eq!("srt".parse::<SubtitleFormat>().unwrap(), SubtitleFormat::Srt);
    assert_eq!(" VTT ".parse::<SubtitleFormat>().unwrap(), SubtitleFormat::Vtt);
    assert_eq!(".txt".parse::<SubtitleFormat>().unwrap(), SubtitleFormat::Txt);
}

/// WHAT: Unknown format tags are rejected with the tag
/// WHY: The error must name what the user asked for
#[test]
fn given_unknown_tag_when_parsing_then_invalid_format() {
    let result = "ass".parse::<SubtitleFormat>();

    match result {
        Err(SubtitleExportError::InvalidFormat { format, .. }) => assert_eq!(format, "ass"),
        other => panic!("expected InvalidFormat, got {other:?}"),
    }
}

/// WHAT: Options deserialize with missing fields defaulted
/// WHY: Options are read from hand-edited config files
#[test]
fn given_partial_json_when_deserializing_options_then_missing_fields_defaulted() {
    let options: SubtitleExportOptions =
        serde_json::from_str(r#"{ "format": "vtt", "content_option": "original_only" }"#).unwrap();

    assert_eq!(options.format, SubtitleFormat::Vtt);
    assert_eq!(options.content_option, ContentOption::OriginalOnly);
    assert!(options.include_timestamps);
    assert_eq!(options.bilingual_order, BilingualOrder::TranslationFirst);
}
