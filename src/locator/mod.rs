//! Locating the export file to send

use crate::config::ExportConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Supplies the path of the attachment to deliver
///
/// The returned path is not guaranteed to exist by the time it is used;
/// the delivery service checks again.
pub trait FileLocator {
    fn locate(&self) -> io::Result<Option<PathBuf>>;
}

/// Picks the most recently modified file in a directory
#[derive(Debug, Clone)]
pub struct LatestFileLocator {
    dir: PathBuf,
    extension: Option<String>,
}

impl LatestFileLocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: None,
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            extension: config.extension.clone(),
        }
    }

    /// Only consider files with this extension (case-insensitive)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into().trim_start_matches('.').to_string());
        self
    }

    fn matches(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(true, |name| name.starts_with('.'));
        if hidden {
            return false;
        }

        match &self.extension {
            Some(wanted) => path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted)),
            None => true,
        }
    }
}

impl FileLocator for LatestFileLocator {
    fn locate(&self) -> io::Result<Option<PathBuf>> {
        let mut latest: Option<(SystemTime, PathBuf)> = None;

        for entry in fs::read_dir(&self.dir)? {
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            // Entries that vanish or dangle mid-scan are skipped
            let Ok(meta) = fs::metadata(&path) else {
                continue;
            };
            if !meta.is_file() || !self.matches(&path) {
                continue;
            }

            let Ok(modified) = meta.modified() else {
                continue;
            };
            if latest.as_ref().map_or(true, |(best, _)| modified > *best) {
                latest = Some((modified, path));
            }
        }

        Ok(latest.map(|(_, path)| path))
    }
}
