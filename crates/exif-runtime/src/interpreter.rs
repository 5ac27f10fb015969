use std::rc::Rc;
use std::time::Duration;

use exif_core::{
    DeferredTask, ExecState, ExifError, FrameKind, Interaction, PauseReason, Surface,
    SurfaceSnapshot,
};
use exif_parser::{BlockRegistry, ScriptDocument, ScriptElement};
use tracing::{debug, warn};

use crate::flags::FlagStore;
use crate::frame::{CallStack, Frame};
use crate::host::{DocumentLoader, ManualTimer, MemoryPresenter, Presenter, Timer, XmlMapLoader};

mod choice;
mod dispatch;

pub const DEFAULT_CHOICE_DELAY: Duration = Duration::from_millis(300);
/// Written to the speaker surface for unspoken text.
pub const SPEAKER_PLACEHOLDER: &str = "\u{200B}";

pub struct InterpreterOptions {
    pub presenter: Box<dyn Presenter>,
    pub loader: Box<dyn DocumentLoader>,
    pub timer: Box<dyn Timer>,
    pub choice_delay: Option<Duration>,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            presenter: Box::new(MemoryPresenter::new()),
            loader: Box::new(XmlMapLoader::default()),
            timer: Box::new(ManualTimer::new()),
            choice_delay: None,
        }
    }
}

/// Runs EXIF script documents one element at a time, suspending whenever the
/// reader has to act.
pub struct Interpreter {
    presenter: Box<dyn Presenter>,
    loader: Box<dyn DocumentLoader>,
    timer: Box<dyn Timer>,
    choice_delay: Duration,

    flags: FlagStore,
    registry: BlockRegistry,
    current_file: Option<String>,

    stack: CallStack,
    state: ExecState,
    pending_options: Vec<(String, Rc<ScriptElement>)>,
    pending_append: Option<String>,
    generation: u64,
}

impl Interpreter {
    pub fn new(options: InterpreterOptions) -> Self {
        Self {
            presenter: options.presenter,
            loader: options.loader,
            timer: options.timer,
            choice_delay: options.choice_delay.unwrap_or(DEFAULT_CHOICE_DELAY),
            flags: FlagStore::new(),
            registry: BlockRegistry::default(),
            current_file: None,
            stack: CallStack::default(),
            state: ExecState::Running,
            pending_options: Vec::new(),
            pending_append: None,
            generation: 0,
        }
    }

    /// Fetches `file` and starts at `block`, or at the first declared block.
    pub fn load(&mut self, file: &str, block: Option<&str>) -> Result<(), ExifError> {
        let document = self.loader.fetch(file)?;
        self.load_document(file, &document, block)
    }

    /// Installs an already parsed document under the name `file`.
    pub fn load_document(
        &mut self,
        file: &str,
        document: &ScriptDocument,
        block: Option<&str>,
    ) -> Result<(), ExifError> {
        let registry = BlockRegistry::from_document(document);
        for id in registry.duplicates() {
            warn!(file, id = %id, "duplicate block id, the last declaration wins");
        }
        debug!(file, blocks = registry.len(), "document loaded");

        self.registry = registry;
        self.current_file = Some(file.to_string());
        self.stack.clear();
        self.pending_options.clear();
        self.generation += 1;
        self.state = ExecState::Running;

        let start = match block {
            Some(id) => id.to_string(),
            None => self
                .registry
                .first()
                .map(|(id, _)| id.to_string())
                .ok_or_else(|| {
                    ExifError::new(
                        "ENGINE_NO_BLOCKS",
                        format!("Document \"{}\" declares no block with an id.", file),
                    )
                })?,
        };
        self.call(&start)
    }

    /// Runs steps until the stack empties or execution pauses.
    pub fn play(&mut self) -> Result<(), ExifError> {
        while !self.state.is_paused() && self.step()? {}
        Ok(())
    }

    /// Executes one element. Returns whether anything is left to run.
    pub fn step(&mut self) -> Result<bool, ExifError> {
        self.stack.unwind_exhausted();
        let Some(element) = self.stack.top_mut().and_then(Frame::next_item) else {
            self.finish_if_idle();
            return Ok(false);
        };

        self.execute(&element)?;

        self.stack.unwind_exhausted();
        if self.stack.is_empty() {
            self.finish_if_idle();
            return Ok(false);
        }
        Ok(true)
    }

    /// Continues after a pause caused by displayed text or `<pause/>`.
    pub fn resume(&mut self) -> Result<(), ExifError> {
        match self.state {
            ExecState::Paused {
                reason: PauseReason::Choice,
            } if !self.pending_options.is_empty() => Err(ExifError::new(
                "ENGINE_CHOICE_PENDING",
                "A choice is pending; choose one of its options.",
            )),
            ExecState::Paused { .. } => self.continue_run(),
            _ => Err(ExifError::new(
                "ENGINE_NOT_PAUSED",
                "Execution is not paused.",
            )),
        }
    }

    /// Enters the option presented under `label` and continues.
    pub fn choose(&mut self, label: &str) -> Result<(), ExifError> {
        let option = self
            .pending_options
            .iter()
            .find(|(candidate, _)| candidate == label)
            .map(|(_, element)| Rc::clone(element))
            .ok_or_else(|| ExifError::unknown_option(label))?;

        debug!(label, "option chosen");
        self.stack.push(option, FrameKind::Option);
        self.pending_options.clear();
        self.continue_run()
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    /// The element that will run next, if any. Never moves a cursor.
    pub fn lookahead(&self) -> Option<&Rc<ScriptElement>> {
        self.stack.lookahead()
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    /// Labels of the options currently on offer, in presentation order.
    pub fn pending_options(&self) -> Vec<&str> {
        self.pending_options
            .iter()
            .map(|(label, _)| label.as_str())
            .collect()
    }

    pub fn pending_append(&self) -> Option<&str> {
        self.pending_append.as_deref()
    }

    pub fn flags(&self) -> &FlagStore {
        &self.flags
    }

    pub fn set_flags(&mut self, names: &str) -> bool {
        self.flags.set_flags(names)
    }

    pub fn clear_flags(&mut self, names: &str) -> bool {
        self.flags.clear_flags(names)
    }

    pub fn check_flags(&self, names: &str) -> bool {
        self.flags.check_flags(names)
    }

    pub fn presenter(&self) -> &dyn Presenter {
        self.presenter.as_ref()
    }

    pub fn surfaces(&self) -> SurfaceSnapshot {
        self.presenter.snapshot()
    }

    pub fn read_surface_named(&self, name: &str) -> Result<String, ExifError> {
        Surface::from_name(name).map(|surface| self.presenter.read(surface))
    }

    /// Applies a task handed back by the timer unless the session has moved
    /// on since it was scheduled.
    pub fn run_deferred(&mut self, task: DeferredTask) -> bool {
        if task.generation != self.generation {
            debug!(
                task_generation = task.generation,
                generation = self.generation,
                "discarding stale deferred task"
            );
            return false;
        }
        self.presenter.write(task.surface, &task.markup);
        true
    }

    fn call(&mut self, id: &str) -> Result<(), ExifError> {
        let block = self
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| ExifError::unknown_block(id))?;
        debug!(block = id, depth = self.stack.depth(), "entering block");
        self.stack.push(block, FrameKind::Standard);
        Ok(())
    }

    fn pause(&mut self, reason: PauseReason) {
        debug!(?reason, depth = self.stack.depth(), "paused");
        self.state = ExecState::Paused { reason };
        if reason == PauseReason::Continue {
            self.presenter
                .write(Surface::Interaction, &Interaction::Continue.render());
        }
    }

    fn continue_run(&mut self) -> Result<(), ExifError> {
        self.state = ExecState::Running;
        self.generation += 1;
        if let Some(appended) = self.pending_append.take() {
            let current = self.presenter.read(Surface::Description);
            self.presenter
                .write(Surface::Description, &format!("{} {}", current, appended));
        }
        self.play()
    }

    fn finish_if_idle(&mut self) {
        if !self.state.is_paused() {
            self.state = ExecState::Finished;
        }
    }
}
