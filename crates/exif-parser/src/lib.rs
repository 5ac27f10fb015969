mod registry;
mod xml;

pub use registry::BlockRegistry;
pub use xml::{parse_script_document, ScriptDocument, ScriptElement};
