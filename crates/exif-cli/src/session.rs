use std::time::{Duration, Instant};

use exif_api::{create_interpreter_from_xml, CreateInterpreterFromXmlOptions};
use exif_core::{DeferredTask, ExifError};
use exif_runtime::{Interpreter, ManualTimer};

use crate::{LoadedStory, PlayerAction, SourceArgs};

/// An interpreter together with the host end of its timer queue.
pub(crate) struct Session {
    pub(crate) interpreter: Interpreter,
    pub(crate) timer: ManualTimer,
}

pub(crate) fn create_session(
    story: &LoadedStory,
    source: &SourceArgs,
    choice_delay: Duration,
) -> Result<Session, ExifError> {
    let timer = ManualTimer::new();
    let mut options = CreateInterpreterFromXmlOptions::new(story.documents_xml.clone());
    options.entry_file = source.file.clone();
    options.entry_block = source.block.clone();
    options.timer = Some(Box::new(timer.clone()));
    options.choice_delay = Some(choice_delay);

    let interpreter = create_interpreter_from_xml(options)?;
    Ok(Session { interpreter, timer })
}

impl Session {
    /// Runs deferred tasks that are due now. Returns how many were applied.
    pub(crate) fn run_due(&mut self) -> usize {
        let tasks = self.timer.take_due(Instant::now());
        self.apply_tasks(tasks)
    }

    /// Runs every queued task without waiting for its due time.
    pub(crate) fn run_all_deferred(&mut self) -> usize {
        let tasks = self.timer.drain();
        self.apply_tasks(tasks)
    }

    /// Blocks until the queue is empty, applying tasks as they fall due.
    pub(crate) fn settle(&mut self) {
        while let Some(due) = self.timer.next_due() {
            let now = Instant::now();
            if due > now {
                std::thread::sleep(due - now);
            }
            self.run_due();
        }
    }

    pub(crate) fn apply(&mut self, action: &PlayerAction) -> Result<(), ExifError> {
        match action {
            PlayerAction::Next => self.interpreter.resume(),
            PlayerAction::Choose(label) => self.interpreter.choose(label),
        }
    }

    fn apply_tasks(&mut self, tasks: Vec<DeferredTask>) -> usize {
        let mut applied = 0;
        for task in tasks {
            if self.interpreter.run_deferred(task) {
                applied += 1;
            }
        }
        applied
    }
}
