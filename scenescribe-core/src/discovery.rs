//! File discovery module for finding video files to process.
//!
//! Scans the top level of the provided directory for .mp4 files
//! (case-insensitive) and returns their paths sorted by filename, so a run
//! always visits videos in a stable order. Subdirectories are not searched.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

/// Finds video files eligible for processing in the specified directory.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Sorted paths of the discovered .mp4 files
/// * `Err(CoreError::NoFilesFound)` - If no .mp4 files are found
pub fn find_processable_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();

            if !path.is_file() {
                return None;
            }

            path.extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext_str| ext_str.eq_ignore_ascii_case("mp4"))
                .map(|_| path.clone())
        })
        .collect();

    files.sort();

    if files.is_empty() {
        Err(CoreError::NoFilesFound)
    } else {
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn finds_only_mp4_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mp4", "a.MP4", "notes.txt", "c.mkv"] {
            File::create(dir.path().join(name)).unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.mp4")).unwrap();

        let files = find_processable_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.MP4", "b.mp4"]);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            find_processable_files(dir.path()),
            Err(CoreError::NoFilesFound)
        ));
    }
}
