//! Directory and batch-input discovery, grounded on the teacher's
//! `FileParser`: recursively walk a directory and collect file paths,
//! leaving filtering (media vs. text, extension allow-lists) to the caller.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub struct FileParser {
    pub files: Vec<PathBuf>,
}

impl Default for FileParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FileParser {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Walks `directory_path` recursively, collecting every regular file.
    /// Hidden files (dotfiles) are skipped, matching the teacher's file
    /// discovery which only ever globs by explicit extension.
    pub fn discover(&mut self, directory_path: &Path) -> std::io::Result<Vec<PathBuf>> {
        let files: Vec<PathBuf> = WalkDir::new(directory_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
            .map(|entry| entry.path().to_path_buf())
            .collect();

        self.files = files.clone();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn discover_finds_nested_regular_files() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::write(dir.path().join("sub/b.txt"), b"b").unwrap();
        std::fs::write(dir.path().join(".hidden"), b"c").unwrap();

        let mut parser = FileParser::new();
        let files = parser.discover(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }
}
