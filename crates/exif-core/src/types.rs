use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ExifError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn synthetic() -> Self {
        Self {
            start: SourceLocation { line: 1, column: 1 },
            end: SourceLocation { line: 1, column: 1 },
        }
    }
}

/// One of the five named presentation channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Surface {
    Default,
    Speaker,
    Interaction,
    Title,
    Description,
}

impl Surface {
    pub const ALL: [Surface; 5] = [
        Surface::Title,
        Surface::Description,
        Surface::Speaker,
        Surface::Default,
        Surface::Interaction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Speaker => "SPEAKER",
            Self::Interaction => "INTERACTION",
            Self::Title => "TITLE",
            Self::Description => "DESCRIPTION",
        }
    }

    /// Class name a browser page uses to mark the element backing this surface.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Default => "exif-text",
            Self::Speaker => "exif-speaker",
            Self::Interaction => "exif-buttons",
            Self::Title => "exif-title",
            Self::Description => "exif-desc",
        }
    }

    /// Resolves a channel name or its css class.
    pub fn from_name(name: &str) -> Result<Self, ExifError> {
        Self::ALL
            .into_iter()
            .find(|surface| surface.name() == name || surface.css_class() == name)
            .ok_or_else(|| ExifError::unknown_target(name))
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameKind {
    Standard,
    Option,
    ToDescription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PauseReason {
    Continue,
    Choice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExecState {
    Running,
    Paused { reason: PauseReason },
    Finished,
}

impl ExecState {
    pub fn is_paused(self) -> bool {
        matches!(self, Self::Paused { .. })
    }
}

pub const END_INDICATOR: &str = "END";

/// What the interaction surface offers the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Continue,
    Options { labels: Vec<String>, active: bool },
    End,
}

impl Interaction {
    pub fn render(&self) -> String {
        match self {
            Self::Continue => "<a data-exif-action=\"resume\">Next</a>".to_string(),
            Self::Options { labels, active } => labels
                .iter()
                .map(|label| {
                    if *active {
                        format!(
                            "<a data-exif-action=\"choose\" data-exif-option=\"{}\">{}</a><br/>",
                            escape_attribute(label),
                            label
                        )
                    } else {
                        format!("<a data-exif-action=\"none\">{}</a><br/>", label)
                    }
                })
                .collect(),
            Self::End => END_INDICATOR.to_string(),
        }
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// A delayed surface write handed to a host timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredTask {
    pub generation: u64,
    pub surface: Surface,
    pub markup: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceSnapshot {
    pub title: String,
    pub description: String,
    pub speaker: String,
    pub text: String,
    pub interaction: String,
}
