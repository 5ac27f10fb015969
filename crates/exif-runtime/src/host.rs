use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::{Duration, Instant};

use exif_core::{DeferredTask, ExifError, Surface, SurfaceSnapshot};
use exif_parser::{parse_script_document, ScriptDocument};

/// The five channels a story is shown on.
pub trait Presenter {
    fn write(&mut self, surface: Surface, markup: &str);
    fn read(&self, surface: Surface) -> String;

    fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            title: self.read(Surface::Title),
            description: self.read(Surface::Description),
            speaker: self.read(Surface::Speaker),
            text: self.read(Surface::Default),
            interaction: self.read(Surface::Interaction),
        }
    }
}

pub trait DocumentLoader {
    fn fetch(&self, path: &str) -> Result<ScriptDocument, ExifError>;
}

/// Fire-and-forget scheduling of a deferred surface write. Hosts hand the task
/// back through `Interpreter::run_deferred` once the delay has passed.
pub trait Timer {
    fn schedule_delayed(&mut self, task: DeferredTask, delay: Duration);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPresenter {
    surfaces: BTreeMap<Surface, String>,
}

impl MemoryPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for MemoryPresenter {
    fn write(&mut self, surface: Surface, markup: &str) {
        self.surfaces.insert(surface, markup.to_string());
    }

    fn read(&self, surface: Surface) -> String {
        self.surfaces.get(&surface).cloned().unwrap_or_default()
    }
}

/// Serves documents from an in-memory map of path to XML source.
#[derive(Debug, Clone, Default)]
pub struct XmlMapLoader {
    sources: BTreeMap<String, String>,
}

impl XmlMapLoader {
    pub fn new(sources: BTreeMap<String, String>) -> Self {
        Self { sources }
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }
}

impl DocumentLoader for XmlMapLoader {
    fn fetch(&self, path: &str) -> Result<ScriptDocument, ExifError> {
        let normalized = path.trim_start_matches("./");
        let source = self.sources.get(normalized).ok_or_else(|| {
            ExifError::new("LOAD_NOT_FOUND", format!("Document not found: {}", path))
        })?;
        parse_script_document(source)
    }
}

#[derive(Debug, Clone)]
struct Scheduled {
    due: Instant,
    task: DeferredTask,
}

/// A timer queue the host polls. Clones share the same queue, so a host keeps
/// one handle while the interpreter owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    queue: Rc<RefCell<VecDeque<Scheduled>>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Removes and returns the tasks due at `now`, oldest first.
    pub fn take_due(&self, now: Instant) -> Vec<DeferredTask> {
        let mut queue = self.queue.borrow_mut();
        let (due, waiting): (VecDeque<_>, VecDeque<_>) =
            queue.drain(..).partition(|scheduled| scheduled.due <= now);
        *queue = waiting;
        due.into_iter().map(|scheduled| scheduled.task).collect()
    }

    /// Removes every task regardless of its due time.
    pub fn drain(&self) -> Vec<DeferredTask> {
        self.queue
            .borrow_mut()
            .drain(..)
            .map(|scheduled| scheduled.task)
            .collect()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.queue.borrow().iter().map(|scheduled| scheduled.due).min()
    }
}

impl Timer for ManualTimer {
    fn schedule_delayed(&mut self, task: DeferredTask, delay: Duration) {
        self.queue.borrow_mut().push_back(Scheduled {
            due: Instant::now() + delay,
            task,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(generation: u64) -> DeferredTask {
        DeferredTask {
            generation,
            surface: Surface::Interaction,
            markup: format!("gen-{}", generation),
        }
    }

    #[test]
    fn memory_presenter_replaces_and_snapshots() {
        let mut presenter = MemoryPresenter::new();
        assert_eq!(presenter.read(Surface::Title), "");
        presenter.write(Surface::Title, "Cave");
        presenter.write(Surface::Title, "Forest");
        presenter.write(Surface::Default, "Hello");
        let snapshot = presenter.snapshot();
        assert_eq!(snapshot.title, "Forest");
        assert_eq!(snapshot.text, "Hello");
        assert_eq!(snapshot.interaction, "");
    }

    #[test]
    fn map_loader_fetches_and_reports_missing_paths() {
        let mut sources = BTreeMap::new();
        sources.insert("story/main.xml".to_string(), "<exif/>".to_string());
        sources.insert("broken.xml".to_string(), "<exif>".to_string());
        let loader = XmlMapLoader::new(sources);

        let document = loader.fetch("./story/main.xml").expect("document should load");
        assert_eq!(document.root.name, "exif");

        let missing = loader.fetch("nope.xml").expect_err("missing path");
        assert_eq!(missing.code, "LOAD_NOT_FOUND");
        let broken = loader.fetch("broken.xml").expect_err("bad xml");
        assert_eq!(broken.code, "XML_PARSE_ERROR");
        assert_eq!(loader.paths().count(), 2);
    }

    #[test]
    fn manual_timer_shares_queue_between_clones() {
        let host_handle = ManualTimer::new();
        let mut engine_handle = host_handle.clone();
        engine_handle.schedule_delayed(task(1), Duration::from_millis(0));
        engine_handle.schedule_delayed(task(2), Duration::from_secs(3600));
        assert_eq!(host_handle.pending(), 2);

        let due = host_handle.take_due(Instant::now());
        assert_eq!(due, vec![task(1)]);
        assert_eq!(host_handle.pending(), 1);
        assert!(host_handle.next_due().is_some());

        assert_eq!(host_handle.drain(), vec![task(2)]);
        assert_eq!(host_handle.pending(), 0);
    }
}
