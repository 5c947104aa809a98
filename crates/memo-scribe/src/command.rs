use crate::AppError;

use memo_scribe_core::{AudioFormat, SubtitleFormat};

use std::{panic::Location, str::FromStr};

use error_location::ErrorLocation;
use uuid::Uuid;

/// Commands read from stdin, one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// `start [format]`: begin a capture (configured default format if omitted).
    Start {
        /// Requested container format.
        format: Option<AudioFormat>,
    },
    /// `pause`
    Pause,
    /// `resume`
    Resume,
    /// `stop`: finish the capture and save it to the library.
    Stop,
    /// `save`: checkpoint the active capture now.
    Save,
    /// `status`
    Status,
    /// `list`: saved recordings, newest first.
    List,
    /// `select <id>` / `select none`
    Select {
        /// Recording to select, or `None` to clear.
        id: Option<Uuid>,
    },
    /// `delete <id>`
    Delete {
        /// Recording to delete.
        id: Uuid,
    },
    /// `export-audio [id]`: the selected recording if no id is given.
    ExportAudio {
        /// Recording to export.
        id: Option<Uuid>,
    },
    /// `export-subtitles [id] [format]`
    ExportSubtitles {
        /// Recording to export; the selected one if omitted.
        id: Option<Uuid>,
        /// Document format; the configured one if omitted.
        format: Option<SubtitleFormat>,
    },
    /// `recover`: save every incomplete recording.
    Recover,
    /// `discard`: delete every incomplete recording.
    Discard,
    /// `help`
    Help,
    /// `quit` / `exit`
    Quit,
}

/// One-line summary of every command.
pub const HELP: &str = "\
commands:
  start [m4a|wav|mp3]            begin recording
  pause | resume                 suspend or continue the capture
  stop                           finish and save to the library
  save                           checkpoint the capture now
  status                         recorder state
  list                           saved recordings
  select <id>|none               choose a recording for export
  delete <id>                    remove a saved recording
  export-audio [id]              write a recording's audio file
  export-subtitles [id] [format] write subtitles (srt, vtt, txt)
  recover | discard              handle recordings left by a crash
  quit";

impl FromStr for AppCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(parse_error(line, "empty command"));
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("start", []) => AppCommand::Start { format: None },
            ("start", [format]) => AppCommand::Start {
                format: Some(
                    format
                        .parse()
                        .map_err(|_| parse_error(line, "unknown audio format"))?,
                ),
            },
            ("pause", []) => AppCommand::Pause,
            ("resume", []) => AppCommand::Resume,
            ("stop", []) => AppCommand::Stop,
            ("save", []) => AppCommand::Save,
            ("status", []) => AppCommand::Status,
            ("list" | "ls", []) => AppCommand::List,
            ("select", ["none"]) => AppCommand::Select { id: None },
            ("select", [id]) => AppCommand::Select {
                id: Some(parse_id(line, id)?),
            },
            ("delete" | "rm", [id]) => AppCommand::Delete {
                id: parse_id(line, id)?,
            },
            ("export-audio", []) => AppCommand::ExportAudio { id: None },
            ("export-audio", [id]) => AppCommand::ExportAudio {
                id: Some(parse_id(line, id)?),
            },
            ("export-subtitles", rest) => parse_export_subtitles(line, rest)?,
            ("recover", []) => AppCommand::Recover,
            ("discard", []) => AppCommand::Discard,
            ("help" | "?", []) => AppCommand::Help,
            ("quit" | "exit", []) => AppCommand::Quit,
            (
                "start" | "pause" | "resume" | "stop" | "save" | "status" | "list" | "ls"
                | "select" | "delete" | "rm" | "export-audio" | "recover" | "discard" | "help"
                | "?" | "quit" | "exit",
                _,
            ) => return Err(parse_error(line, "wrong number of arguments")),
            _ => return Err(parse_error(line, "unknown command")),
        };

        Ok(command)
    }
}

/// Accepts an id, a format, or both in either order.
#[track_caller]
fn parse_export_subtitles(line: &str, args: &[&str]) -> Result<AppCommand, AppError> {
    if args.len() > 2 {
        return Err(parse_error(line, "wrong number of arguments"));
    }

    let mut id = None;
    let mut format = None;

    for arg in args {
        if let Ok(parsed) = Uuid::parse_str(arg) {
            if id.replace(parsed).is_some() {
                return Err(parse_error(line, "more than one recording id"));
            }
        } else if let Ok(parsed) = arg.parse::<SubtitleFormat>() {
            if format.replace(parsed).is_some() {
                return Err(parse_error(line, "more than one subtitle format"));
            }
        } else {
            return Err(parse_error(line, "expected a recording id or subtitle format"));
        }
    }

    Ok(AppCommand::ExportSubtitles { id, format })
}

#[track_caller]
fn parse_id(line: &str, id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| parse_error(line, "invalid recording id"))
}

#[track_caller]
fn parse_error(line: &str, reason: &str) -> AppError {
    AppError::CommandParse {
        input: line.trim().to_string(),
        reason: reason.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}
