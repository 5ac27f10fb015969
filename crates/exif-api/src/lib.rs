use std::collections::BTreeMap;
use std::time::Duration;

use exif_core::ExifError;
use exif_runtime::{
    Interpreter, InterpreterOptions, ManualTimer, MemoryPresenter, Presenter, Timer, XmlMapLoader,
};

pub const DEFAULT_ENTRY_FILE: &str = "main.xml";

pub struct CreateInterpreterFromXmlOptions {
    pub documents_xml: BTreeMap<String, String>,
    pub entry_file: Option<String>,
    pub entry_block: Option<String>,
    pub presenter: Option<Box<dyn Presenter>>,
    pub timer: Option<Box<dyn Timer>>,
    pub choice_delay: Option<Duration>,
}

impl CreateInterpreterFromXmlOptions {
    pub fn new(documents_xml: BTreeMap<String, String>) -> Self {
        Self {
            documents_xml,
            entry_file: None,
            entry_block: None,
            presenter: None,
            timer: None,
            choice_delay: None,
        }
    }
}

/// Builds an interpreter over an in-memory set of documents and loads the
/// entry file. The returned interpreter is ready for `play`.
pub fn create_interpreter_from_xml(
    options: CreateInterpreterFromXmlOptions,
) -> Result<Interpreter, ExifError> {
    let entry_file = resolve_entry_file(&options.documents_xml, options.entry_file)?;

    let mut interpreter = Interpreter::new(InterpreterOptions {
        presenter: options
            .presenter
            .unwrap_or_else(|| Box::new(MemoryPresenter::new())),
        loader: Box::new(XmlMapLoader::new(options.documents_xml)),
        timer: options.timer.unwrap_or_else(|| Box::new(ManualTimer::new())),
        choice_delay: options.choice_delay,
    });

    interpreter.load(&entry_file, options.entry_block.as_deref())?;
    Ok(interpreter)
}

fn resolve_entry_file(
    documents: &BTreeMap<String, String>,
    explicit: Option<String>,
) -> Result<String, ExifError> {
    if let Some(entry) = explicit {
        if !documents.contains_key(&entry) {
            return Err(ExifError::new(
                "API_ENTRY_FILE_NOT_FOUND",
                format!("Entry file \"{}\" is not among the documents.", entry),
            ));
        }
        return Ok(entry);
    }

    if documents.contains_key(DEFAULT_ENTRY_FILE) {
        return Ok(DEFAULT_ENTRY_FILE.to_string());
    }

    if documents.len() == 1 {
        if let Some(only) = documents.keys().next() {
            return Ok(only.clone());
        }
    }

    Err(ExifError::new(
        "API_ENTRY_MAIN_NOT_FOUND",
        format!("Expected a document named \"{}\" as default entry.", DEFAULT_ENTRY_FILE),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use exif_core::{ExecState, Surface};

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn create_interpreter_defaults_to_main_document() {
        let mut interpreter = create_interpreter_from_xml(CreateInterpreterFromXmlOptions::new(map(&[
            ("main.xml", r#"<exif><block id="start"><title>Main</title><text>Hi</text></block></exif>"#),
            ("side.xml", r#"<exif><block id="side"><title>Side</title></block></exif>"#),
        ])))
        .expect("interpreter should build");

        assert_eq!(interpreter.current_file(), Some("main.xml"));
        interpreter.play().expect("play");
        assert_eq!(interpreter.presenter().read(Surface::Title), "Main");
        assert_eq!(interpreter.state(), ExecState::Finished);
    }

    #[test]
    fn create_interpreter_uses_explicit_entry_and_block() {
        let mut options = CreateInterpreterFromXmlOptions::new(map(&[(
            "chapter1.xml",
            r#"<exif><block id="a"><title>A</title></block><block id="b"><title>B</title></block></exif>"#,
        )]));
        options.entry_file = Some("chapter1.xml".to_string());
        options.entry_block = Some("b".to_string());

        let mut interpreter = create_interpreter_from_xml(options).expect("interpreter should build");
        interpreter.play().expect("play");
        assert_eq!(interpreter.presenter().read(Surface::Title), "B");
    }

    #[test]
    fn single_document_is_the_default_entry() {
        let interpreter = create_interpreter_from_xml(CreateInterpreterFromXmlOptions::new(map(&[(
            "story.xml",
            r#"<exif><block id="only"/></exif>"#,
        )])))
        .expect("interpreter should build");
        assert_eq!(interpreter.current_file(), Some("story.xml"));
    }

    #[test]
    fn entry_resolution_errors() {
        let mut options = CreateInterpreterFromXmlOptions::new(map(&[("a.xml", "<exif/>")]));
        options.entry_file = Some("b.xml".to_string());
        let error = create_interpreter_from_xml(options)
            .err()
            .expect("missing explicit entry");
        assert_eq!(error.code, "API_ENTRY_FILE_NOT_FOUND");

        let error = create_interpreter_from_xml(CreateInterpreterFromXmlOptions::new(map(&[
            ("a.xml", "<exif/>"),
            ("b.xml", "<exif/>"),
        ])))
        .err()
        .expect("no main document");
        assert_eq!(error.code, "API_ENTRY_MAIN_NOT_FOUND");

        let mut options = CreateInterpreterFromXmlOptions::new(map(&[(
            "main.xml",
            "<exif><block id=\"x\"/></exif>",
        )]));
        options.entry_block = Some("y".to_string());
        let error = create_interpreter_from_xml(options)
            .err()
            .expect("unknown entry block");
        assert_eq!(error.code, "ENGINE_UNKNOWN_BLOCK");
    }
}
