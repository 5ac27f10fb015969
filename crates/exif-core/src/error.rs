use crate::types::SourceSpan;
use thiserror::Error;

pub const MISSING_ATTRIBUTE: &str = "ENGINE_MISSING_ATTRIBUTE";
pub const UNKNOWN_BLOCK: &str = "ENGINE_UNKNOWN_BLOCK";
pub const UNKNOWN_TARGET: &str = "ENGINE_UNKNOWN_TARGET";
pub const UNKNOWN_OPTION: &str = "ENGINE_UNKNOWN_OPTION";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ExifError {
    pub code: String,
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl ExifError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(
        code: impl Into<String>,
        message: impl Into<String>,
        span: SourceSpan,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn missing_attribute(tag: &str, attribute: &str, span: SourceSpan) -> Self {
        Self::with_span(
            MISSING_ATTRIBUTE,
            format!("<{}> tag must have '{}' attribute.", tag, attribute),
            span,
        )
    }

    pub fn unknown_block(id: &str) -> Self {
        Self::new(UNKNOWN_BLOCK, format!("Unknown block: <{}>", id))
    }

    pub fn unknown_target(name: &str) -> Self {
        Self::new(UNKNOWN_TARGET, format!("Element not found: <{}>", name))
    }

    pub fn unknown_option(label: &str) -> Self {
        Self::new(UNKNOWN_OPTION, format!("Bad option: <{}>", label))
    }

    /// True when the error came from fetching or parsing a document.
    pub fn is_load_failure(&self) -> bool {
        self.code.starts_with("LOAD_") || self.code == "XML_PARSE_ERROR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_code_and_message() {
        let error = ExifError::unknown_block("cellar");
        assert_eq!(error.to_string(), "ENGINE_UNKNOWN_BLOCK: Unknown block: <cellar>");
        assert!(error.span.is_none());
    }

    #[test]
    fn missing_attribute_keeps_span() {
        let error = ExifError::missing_attribute("call", "block", SourceSpan::synthetic());
        assert_eq!(error.code, MISSING_ATTRIBUTE);
        assert_eq!(error.message, "<call> tag must have 'block' attribute.");
        assert_eq!(error.span, Some(SourceSpan::synthetic()));
    }

    #[test]
    fn load_failure_classification() {
        assert!(ExifError::new("LOAD_NOT_FOUND", "x").is_load_failure());
        assert!(ExifError::new("XML_PARSE_ERROR", "x").is_load_failure());
        assert!(!ExifError::unknown_option("Run").is_load_failure());
    }
}
