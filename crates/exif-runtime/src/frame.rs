use std::rc::Rc;

use exif_core::FrameKind;
use exif_parser::ScriptElement;
use tracing::trace;

/// Iteration state over the element children of one container.
#[derive(Debug, Clone)]
pub struct Frame {
    container: Rc<ScriptElement>,
    cursor: usize,
    kind: FrameKind,
}

impl Frame {
    pub fn new(container: Rc<ScriptElement>, kind: FrameKind) -> Self {
        Self {
            container,
            cursor: 0,
            kind,
        }
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn container(&self) -> &Rc<ScriptElement> {
        &self.container
    }

    pub fn exhausted(&self) -> bool {
        self.cursor >= self.container.children.len()
    }

    pub fn peek(&self) -> Option<&Rc<ScriptElement>> {
        self.container.children.get(self.cursor)
    }

    /// Returns the element under the cursor and advances past it.
    pub fn next_item(&mut self) -> Option<Rc<ScriptElement>> {
        let item = self.container.children.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(item)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    pub fn push(&mut self, container: Rc<ScriptElement>, kind: FrameKind) {
        self.frames.push(Frame::new(container, kind));
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn top_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    pub fn contains_kind(&self, kind: FrameKind) -> bool {
        self.frames.iter().any(|frame| frame.kind() == kind)
    }

    /// Pops frames while the top one has nothing left to run.
    pub fn unwind_exhausted(&mut self) {
        while self.frames.last().is_some_and(Frame::exhausted) {
            self.frames.pop();
        }
    }

    /// The element that would run next, searching from the top frame down.
    pub fn lookahead(&self) -> Option<&Rc<ScriptElement>> {
        for (depth, frame) in self.frames.iter().enumerate().rev() {
            trace!(
                depth,
                container = %frame.container().name,
                exhausted = frame.exhausted(),
                "lookahead probe"
            );
            if let Some(element) = frame.peek() {
                return Some(element);
            }
        }
        trace!("lookahead reached bottom of stack");
        None
    }
}
