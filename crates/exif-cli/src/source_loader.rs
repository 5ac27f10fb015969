use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use exif_core::ExifError;
use tracing::debug;
use walkdir::WalkDir;

use crate::failure::{story_failure, STORY_EMPTY, STORY_NOT_DIR, STORY_NOT_FOUND, STORY_READ};
use crate::LoadedStory;

/// Reads the story under `scripts_dir`, relative to the working directory
/// unless absolute.
pub(crate) fn load_story_from_dir(scripts_dir: &str) -> Result<LoadedStory, ExifError> {
    let root = std::path::absolute(scripts_dir)
        .map_err(story_failure(STORY_NOT_FOUND, Path::new(scripts_dir)))?;

    if !root.exists() {
        return Err(ExifError::new(
            STORY_NOT_FOUND,
            format!("No story directory at {}", root.display()),
        ));
    }
    if !root.is_dir() {
        return Err(ExifError::new(
            STORY_NOT_DIR,
            format!(
                "{} is a file; --scripts-dir expects the story directory",
                root.display()
            ),
        ));
    }

    let documents_xml = read_documents_from_dir(&root)?;
    debug!(root = %root.display(), documents = documents_xml.len(), "story loaded");
    Ok(LoadedStory {
        root,
        documents_xml,
    })
}

/// Reads every `*.xml` file below `root`, keyed by its `/`-separated path
/// relative to `root`. Those keys are what `<load file>` names.
pub(crate) fn read_documents_from_dir(
    root: &Path,
) -> Result<BTreeMap<String, String>, ExifError> {
    let mut documents = BTreeMap::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|error| {
            ExifError::new(STORY_READ, format!("Cannot scan {}: {}", root.display(), error))
        })?;
        let path = entry.path();
        let is_xml = path.extension().and_then(|ext| ext.to_str()) == Some("xml");
        if !entry.file_type().is_file() || !is_xml {
            continue;
        }

        let content = fs::read_to_string(path).map_err(story_failure(STORY_READ, path))?;
        documents.insert(document_key(root, path), content);
    }

    if documents.is_empty() {
        return Err(ExifError::new(
            STORY_EMPTY,
            format!("{} holds no .xml story documents", root.display()),
        ));
    }

    Ok(documents)
}

fn document_key(root: &Path, path: &Path) -> String {
    let relative: PathBuf = path
        .strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf());
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
