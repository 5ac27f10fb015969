mod flags;
mod frame;
mod host;
mod instruction;
mod interpreter;

pub use flags::FlagStore;
pub use frame::{CallStack, Frame};
pub use host::{DocumentLoader, ManualTimer, MemoryPresenter, Presenter, Timer, XmlMapLoader};
pub use instruction::speaker_label;
pub use interpreter::{Interpreter, InterpreterOptions, DEFAULT_CHOICE_DELAY, SPEAKER_PLACEHOLDER};
