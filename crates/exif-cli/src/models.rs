use std::collections::BTreeMap;
use std::path::PathBuf;

use exif_core::{ExecState, ExifError, SurfaceSnapshot};
use serde::Serialize;

use crate::failure::ACTION_INVALID;

#[derive(Debug, Clone)]
pub(crate) struct LoadedStory {
    pub(crate) root: PathBuf,
    pub(crate) documents_xml: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlayerAction {
    Next,
    Choose(String),
}

impl PlayerAction {
    pub(crate) fn parse(raw: &str) -> Result<Self, ExifError> {
        if raw == "next" {
            return Ok(Self::Next);
        }
        match raw.strip_prefix("choose:") {
            Some(label) if !label.is_empty() => Ok(Self::Choose(label.to_string())),
            _ => Err(ExifError::new(
                ACTION_INVALID,
                format!("Unsupported action \"{}\"; expected next or choose:<label>.", raw),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RunReport {
    pub(crate) state: ExecState,
    pub(crate) surfaces: SurfaceSnapshot,
    pub(crate) options: Vec<String>,
    pub(crate) flags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineCommandAction {
    NotHandled,
    Continue,
    Quit,
}
