//! Schema source files and directory discovery.

use crate::config::Config;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One input file: a path relative to the project root plus its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Every file under `root` whose extension is configured, sorted by relative
/// `/`-separated path. Unreadable files are skipped with a warning.
pub fn load_directory(root: &Path, config: &Config) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    collect(root, root, config, &mut files)?;
    files.sort_by(|a, b| a.path.cmp(&b.path));
    log::info!("found {} schema files under {}", files.len(), root.display());
    Ok(files)
}

fn collect(root: &Path, dir: &Path, config: &Config, files: &mut Vec<SourceFile>) -> Result<()> {
    let io_err = |source| Error::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect(root, &path, config, files)?;
            continue;
        }
        if !config.includes(&path) {
            continue;
        }
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Cannot read {}: {}", path.display(), e);
                continue;
            }
        };
        files.push(SourceFile::new(relative_path(root, &path), text));
    }
    Ok(())
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
