use std::path::Path;

use exif_core::ExifError;

pub(crate) const STORY_NOT_FOUND: &str = "CLI_SOURCE_NOT_FOUND";
pub(crate) const STORY_NOT_DIR: &str = "CLI_SOURCE_NOT_DIR";
pub(crate) const STORY_EMPTY: &str = "CLI_SOURCE_EMPTY";
pub(crate) const STORY_READ: &str = "CLI_SOURCE_READ";
pub(crate) const ACTION_INVALID: &str = "CLI_ACTION_INVALID";
pub(crate) const PLAYER_IO: &str = "PLAYER_IO";
pub(crate) const REPORT_JSON: &str = "CLI_REPORT_JSON";

/// Builds the error for an I/O failure on a story file or directory.
pub(crate) fn story_failure<'a>(
    code: &'static str,
    path: &'a Path,
) -> impl Fn(std::io::Error) -> ExifError + 'a {
    move |error| ExifError::new(code, format!("{}: {}", path.display(), error))
}

pub(crate) fn terminal_failure(error: std::io::Error) -> ExifError {
    ExifError::new(PLAYER_IO, format!("terminal: {}", error))
}

pub(crate) fn report_failure(error: serde_json::Error) -> ExifError {
    ExifError::new(REPORT_JSON, format!("cannot encode run report: {}", error))
}

/// A JSON string literal for `value`, as used on every `*_JSON:` and
/// `OPTION:` line.
pub(crate) fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Prints `error` in the `RESULT:` line protocol and returns the exit status.
pub(crate) fn emit_error(error: &ExifError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!("ERROR_MSG_JSON:{}", json_string(&error.message));
    if let Some(span) = &error.span {
        println!("ERROR_AT:{}:{}", span.start.line, span.start.column);
    }
    1
}
