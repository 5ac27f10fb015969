use std::io::{self, BufRead, Write};

use exif_core::{ExecState, ExifError, PauseReason};
use exif_runtime::SPEAKER_PLACEHOLDER;

use crate::failure::terminal_failure;
use crate::{LineCommandAction, Session};

/// Remembers what is already on screen so each surface prints once per change.
#[derive(Debug, Default)]
pub(crate) struct PageView {
    title: String,
    description: String,
    line: (String, String),
}

pub(crate) fn run_line_player(session: &mut Session) -> Result<i32, ExifError> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    run_line_player_with_io(session, &mut reader, &mut writer)
}

pub(crate) fn run_line_player_with_io(
    session: &mut Session,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<i32, ExifError> {
    writeln!(writer, "EXIF player").map_err(terminal_failure)?;
    writeln!(writer, "commands: :flags :help :quit").map_err(terminal_failure)?;

    let mut view = PageView::default();
    session.interpreter.play()?;

    loop {
        match session.interpreter.state() {
            ExecState::Paused {
                reason: PauseReason::Continue,
            } => {
                render_page(session, &mut view, writer)?;
                loop {
                    let Some(raw) = prompt_input_from("[Enter] ", reader, writer)? else {
                        return Ok(0);
                    };
                    match handle_line_command(&raw, session, writer)? {
                        LineCommandAction::Continue => continue,
                        LineCommandAction::Quit => return Ok(0),
                        LineCommandAction::NotHandled => {}
                    }
                    session.interpreter.resume()?;
                    break;
                }
            }
            ExecState::Paused {
                reason: PauseReason::Choice,
            } => {
                session.settle();
                render_page(session, &mut view, writer)?;
                let options = session
                    .interpreter
                    .pending_options()
                    .into_iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>();
                if options.is_empty() {
                    writeln!(writer, "(nothing to choose)").map_err(terminal_failure)?;
                }
                for (index, label) in options.iter().enumerate() {
                    writeln!(writer, "  [{}] {}", index + 1, label).map_err(terminal_failure)?;
                }
                loop {
                    let Some(raw) = prompt_input_from("> ", reader, writer)? else {
                        return Ok(0);
                    };
                    match handle_line_command(&raw, session, writer)? {
                        LineCommandAction::Continue => continue,
                        LineCommandAction::Quit => return Ok(0),
                        LineCommandAction::NotHandled => {}
                    }
                    if options.is_empty() {
                        session.interpreter.resume()?;
                        break;
                    }
                    match resolve_option(&raw, &options) {
                        Some(label) => {
                            session.interpreter.choose(&label)?;
                            break;
                        }
                        None => {
                            writeln!(writer, "No option \"{}\".", raw.trim())
                                .map_err(terminal_failure)?;
                        }
                    }
                }
            }
            ExecState::Running | ExecState::Finished => {
                render_page(session, &mut view, writer)?;
                writeln!(writer).map_err(terminal_failure)?;
                writeln!(writer, "[END]").map_err(terminal_failure)?;
                return Ok(0);
            }
        }
    }
}

pub(crate) fn handle_line_command(
    raw: &str,
    session: &Session,
    writer: &mut dyn Write,
) -> Result<LineCommandAction, ExifError> {
    let command = raw.trim();
    if !command.starts_with(':') {
        return Ok(LineCommandAction::NotHandled);
    }

    match command {
        ":quit" => Ok(LineCommandAction::Quit),
        ":flags" => {
            let flags = session.interpreter.flags().iter().collect::<Vec<_>>();
            if flags.is_empty() {
                writeln!(writer, "(no flags set)").map_err(terminal_failure)?;
            } else {
                writeln!(writer, "flags: {}", flags.join(" ")).map_err(terminal_failure)?;
            }
            Ok(LineCommandAction::Continue)
        }
        ":help" => {
            writeln!(
                writer,
                "Enter continues; a number or label picks an option; :flags :quit"
            )
            .map_err(terminal_failure)?;
            Ok(LineCommandAction::Continue)
        }
        _ => {
            writeln!(writer, "Unknown command: {}", command).map_err(terminal_failure)?;
            Ok(LineCommandAction::Continue)
        }
    }
}

/// A 1-based index or an exact label.
pub(crate) fn resolve_option(raw: &str, options: &[String]) -> Option<String> {
    let raw = raw.trim();
    if let Ok(index) = raw.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|index| options.get(index))
            .cloned();
    }
    options.iter().find(|label| label.as_str() == raw).cloned()
}

fn render_page(
    session: &Session,
    view: &mut PageView,
    writer: &mut dyn Write,
) -> Result<(), ExifError> {
    let surfaces = session.interpreter.surfaces();

    if surfaces.title != view.title {
        if !surfaces.title.is_empty() {
            writeln!(writer).map_err(terminal_failure)?;
            writeln!(writer, "== {} ==", surfaces.title.trim()).map_err(terminal_failure)?;
        }
        view.title = surfaces.title;
    }
    if surfaces.description != view.description {
        if !surfaces.description.is_empty() {
            writeln!(writer, "{}", surfaces.description.trim()).map_err(terminal_failure)?;
        }
        view.description = surfaces.description;
    }

    let line = (surfaces.speaker, surfaces.text);
    if line == view.line || line.1.is_empty() {
        return Ok(());
    }
    writeln!(writer).map_err(terminal_failure)?;
    if line.0.is_empty() || line.0 == SPEAKER_PLACEHOLDER {
        writeln!(writer, "{}", line.1).map_err(terminal_failure)?;
    } else {
        writeln!(writer, "{}: {}", line.0, line.1).map_err(terminal_failure)?;
    }
    view.line = line;
    Ok(())
}

fn prompt_input_from(
    prompt: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<Option<String>, ExifError> {
    write!(writer, "{}", prompt).map_err(terminal_failure)?;
    writer.flush().map_err(terminal_failure)?;

    let mut line = String::new();
    let read = reader.read_line(&mut line).map_err(terminal_failure)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
