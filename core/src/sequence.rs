//! Sequential destination filenames (`1.jpg`, `2.jpg`, ...) per folder and
//! extension.

use rustc_hash::FxHashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Hands out the next free sequential filename in a destination folder.
///
/// Callers invoke `next_name` and, once the file has actually been moved
/// there, `commit` with the same name. A name that is never committed may be
/// handed out again.
pub trait NameAllocator {
    fn next_name(&mut self, folder: &Path, extension: &str) -> Result<String, AllocationError>;

    fn commit(&mut self, _folder: &Path, _extension: &str, _name: &str) {}
}

/// Recounts the folder on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanningAllocator;

impl NameAllocator for ScanningAllocator {
    fn next_name(&mut self, folder: &Path, extension: &str) -> Result<String, AllocationError> {
        let count = count_matching(folder, extension)?;
        Ok(free_name(folder, extension, count + 1))
    }
}

/// Scans each (folder, extension) scope once, then counts in memory.
#[derive(Debug, Default)]
pub struct CountingAllocator {
    counters: FxHashMap<(PathBuf, String), u64>,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&mut self, folder: &Path, extension: &str) -> Result<u64, AllocationError> {
        let key = (folder.to_path_buf(), extension.to_string());
        if let Some(&count) = self.counters.get(&key) {
            return Ok(count);
        }
        let count = count_matching(folder, extension)?;
        self.counters.insert(key, count);
        Ok(count)
    }
}

impl NameAllocator for CountingAllocator {
    fn next_name(&mut self, folder: &Path, extension: &str) -> Result<String, AllocationError> {
        let count = self.counter(folder, extension)?;
        Ok(free_name(folder, extension, count + 1))
    }

    fn commit(&mut self, folder: &Path, extension: &str, name: &str) {
        let Some(number) = sequence_number(name, extension) else {
            return;
        };
        let counter = self
            .counters
            .entry((folder.to_path_buf(), extension.to_string()))
            .or_default();
        *counter = (*counter).max(number);
    }
}

/// Counts entries in `folder` whose name ends with `.{extension}`.
/// The match is case-sensitive; callers lower-case the extension first.
pub fn count_matching(folder: &Path, extension: &str) -> Result<u64, AllocationError> {
    let suffix = format!(".{}", extension);
    let entries = fs::read_dir(folder).map_err(|source| AllocationError::Io {
        source,
        path: folder.to_path_buf(),
    })?;

    let mut count = 0;
    for entry in entries {
        let entry = entry.map_err(|source| AllocationError::Io {
            source,
            path: folder.to_path_buf(),
        })?;
        if entry.file_name().to_string_lossy().ends_with(&suffix) {
            count += 1;
        }
    }
    Ok(count)
}

/// Starting at `number`, returns the first `{n}.{extension}` not present in
/// `folder`.
fn free_name(folder: &Path, extension: &str, mut number: u64) -> String {
    loop {
        let name = format!("{}.{}", number, extension);
        if !folder.join(&name).exists() {
            return name;
        }
        number += 1;
    }
}

fn sequence_number(name: &str, extension: &str) -> Option<u64> {
    name.strip_suffix(extension)?
        .strip_suffix('.')?
        .parse()
        .ok()
}

#[derive(Debug)]
pub enum AllocationError {
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl Display for AllocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { source, path } => {
                write!(f, "unable to list {}: {}", path.display(), source)
            }
        }
    }
}

impl Error for AllocationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(folder: &Path, name: &str) {
        fs::write(folder.join(name), b"x").unwrap();
    }

    fn allocate_three<A: NameAllocator>(allocator: &mut A) -> Vec<String> {
        let dir = tempdir().unwrap();
        let mut names = Vec::new();
        for _ in 0..3 {
            let name = allocator.next_name(dir.path(), "jpg").unwrap();
            touch(dir.path(), &name);
            allocator.commit(dir.path(), "jpg", &name);
            names.push(name);
        }
        names
    }

    #[test]
    fn scanning_allocator_counts_up_from_one() {
        assert_eq!(
            allocate_three(&mut ScanningAllocator),
            vec!["1.jpg", "2.jpg", "3.jpg"]
        );
    }

    #[test]
    fn counting_allocator_counts_up_from_one() {
        assert_eq!(
            allocate_three(&mut CountingAllocator::new()),
            vec!["1.jpg", "2.jpg", "3.jpg"]
        );
    }

    #[test]
    fn scopes_are_per_extension() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "1.jpg");
        touch(dir.path(), "2.jpg");
        touch(dir.path(), "1.png");

        let mut allocator = ScanningAllocator;
        assert_eq!(allocator.next_name(dir.path(), "jpg").unwrap(), "3.jpg");
        assert_eq!(allocator.next_name(dir.path(), "png").unwrap(), "2.png");
        assert_eq!(allocator.next_name(dir.path(), "gif").unwrap(), "1.gif");
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "1.JPG");
        assert_eq!(count_matching(dir.path(), "jpg").unwrap(), 0);
        assert_eq!(count_matching(dir.path(), "JPG").unwrap(), 1);
    }

    #[test]
    fn skips_names_already_taken() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "1.jpg");
        touch(dir.path(), "3.jpg");

        assert_eq!(ScanningAllocator.next_name(dir.path(), "jpg").unwrap(), "4.jpg");
        assert_eq!(
            CountingAllocator::new().next_name(dir.path(), "jpg").unwrap(),
            "4.jpg"
        );
    }

    #[test]
    fn uncommitted_name_is_reissued() {
        let dir = tempdir().unwrap();
        let mut allocator = CountingAllocator::new();
        assert_eq!(allocator.next_name(dir.path(), "png").unwrap(), "1.png");
        // Move failed, nothing committed
        assert_eq!(allocator.next_name(dir.path(), "png").unwrap(), "1.png");
    }

    #[test]
    fn counting_allocator_scans_only_once() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "1.gif");
        let mut allocator = CountingAllocator::new();
        assert_eq!(allocator.next_name(dir.path(), "gif").unwrap(), "2.gif");

        // Files matching the suffix but outside the sequence do not shift the
        // cached counter.
        touch(dir.path(), "holiday.gif");
        assert_eq!(allocator.next_name(dir.path(), "gif").unwrap(), "2.gif");
        assert_eq!(ScanningAllocator.next_name(dir.path(), "gif").unwrap(), "3.gif");
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let error = ScanningAllocator.next_name(&missing, "jpg").unwrap_err();
        assert!(error.to_string().contains("nope"));
    }

    #[test]
    fn parses_sequence_numbers() {
        assert_eq!(sequence_number("12.jpg", "jpg"), Some(12));
        assert_eq!(sequence_number("12.jpeg", "jpg"), None);
        assert_eq!(sequence_number("x.jpg", "jpg"), None);
    }
}
