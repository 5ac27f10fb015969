use std::time::Duration;

use exif_core::{ExecState, ExifError, PauseReason};
use tracing::debug;

use crate::failure::{json_string, report_failure};
use crate::{create_session, load_story_from_dir, PlayerAction, RunArgs, RunReport, Session};

pub(crate) fn run_scripted(args: RunArgs) -> Result<i32, ExifError> {
    let actions = args
        .actions
        .iter()
        .map(|raw| PlayerAction::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let story = load_story_from_dir(&args.source.scripts_dir)?;
    let mut session = create_session(&story, &args.source, Duration::ZERO)?;
    let report = run_actions(&mut session, &actions)?;
    emit_report(&report)?;
    Ok(0)
}

/// Plays to the first pause, then applies `actions` in order. Deferred
/// option lists are flushed after every step so they show as chosen-ready.
pub(crate) fn run_actions(
    session: &mut Session,
    actions: &[PlayerAction],
) -> Result<RunReport, ExifError> {
    session.interpreter.play()?;
    session.run_all_deferred();

    for action in actions {
        debug!(?action, "applying action");
        session.apply(action)?;
        session.run_all_deferred();
    }

    Ok(build_report(session))
}

pub(crate) fn build_report(session: &Session) -> RunReport {
    let interpreter = &session.interpreter;
    RunReport {
        state: interpreter.state(),
        surfaces: interpreter.surfaces(),
        options: interpreter
            .pending_options()
            .into_iter()
            .map(str::to_string)
            .collect(),
        flags: interpreter.flags().iter().map(str::to_string).collect(),
    }
}

pub(crate) fn state_label(state: ExecState) -> &'static str {
    match state {
        ExecState::Running => "RUNNING",
        ExecState::Paused {
            reason: PauseReason::Continue,
        } => "PAUSED_CONTINUE",
        ExecState::Paused {
            reason: PauseReason::Choice,
        } => "PAUSED_CHOICE",
        ExecState::Finished => "FINISHED",
    }
}

/// The whole report as one JSON object, for callers that parse a single line.
pub(crate) fn report_json(report: &RunReport) -> Result<String, ExifError> {
    serde_json::to_string(report).map_err(report_failure)
}

pub(crate) fn emit_report(report: &RunReport) -> Result<(), ExifError> {
    let surfaces = serde_json::to_string(&report.surfaces).map_err(report_failure)?;
    let whole = report_json(report)?;

    println!("RESULT:OK");
    println!("STATE:{}", state_label(report.state));
    println!("SURFACES_JSON:{}", surfaces);
    for option in &report.options {
        println!("OPTION:{}", json_string(option));
    }
    for flag in &report.flags {
        println!("FLAG:{}", flag);
    }
    println!("REPORT_JSON:{}", whole);
    Ok(())
}
