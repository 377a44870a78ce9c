//! Finding and reading source files named in stack frames.
//!
//! Stack frames carry file names as the compiler recorded them, which
//! rarely match the directory the viewer runs from. [`FileReader`] keeps a
//! list of search prefixes and looks for a file whose path ends in the
//! requested name anywhere below one of them. Lookups are cached, found or
//! not, since the same few files are requested over and over while
//! browsing a tree.
//!
//! This lives entirely outside the parsing core; nothing in there touches
//! the filesystem.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Finds and reads text files below a list of search prefixes. The list
/// initially contains the current directory.
#[derive(Debug)]
pub struct FileReader {
    prefixes: Vec<PathBuf>,
    /// Requested path → resolved path, or `None` when a previous search
    /// found nothing.
    cache: HashMap<PathBuf, Option<PathBuf>>,
}

impl FileReader {
    pub fn new() -> Self {
        Self {
            prefixes: vec![PathBuf::from(".")],
            cache: HashMap::new(),
        }
    }

    /// Add another directory to search below.
    pub fn add_prefix(&mut self, prefix: impl Into<PathBuf>) {
        self.prefixes.push(prefix.into());
    }

    /// Read the file found for `path` as a list of lines, newlines
    /// stripped. `None` when no matching readable file exists.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> Option<Vec<String>> {
        let found = self.find_file(path)?;
        let text = fs::read_to_string(found).ok()?;
        Some(text.lines().map(str::to_string).collect())
    }

    /// Search the prefixes for a file whose path ends in `path`. The
    /// requested path may itself contain directories: searching for
    /// `utility/config.h` can resolve to
    /// `./sources/include/helper/utility/config.h`.
    pub fn find_file(&mut self, path: impl AsRef<Path>) -> Option<PathBuf> {
        let path = path.as_ref();
        if let Some(cached) = self.cache.get(path) {
            return cached.clone();
        }

        let found = self
            .prefixes
            .iter()
            .find_map(|prefix| find_below(prefix, path));
        self.cache.insert(path.to_path_buf(), found.clone());
        found
    }
}

impl Default for FileReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk every directory below `prefix`, looking for one that contains a
/// file at the relative `path`.
fn find_below(prefix: &Path, path: &Path) -> Option<PathBuf> {
    WalkDir::new(prefix)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.path().join(path))
        .find(|candidate| candidate.is_file())
}
