use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

const DOCUMENT_EXTENSION: &str = "docx";

/// Office writes `~$name.docx` lock files next to open documents.
const LOCK_FILE_PREFIX: &str = "~$";

/// List requirement documents directly inside `dir`, sorted by file name.
///
/// The directory is created when missing so a first run leaves an obvious
/// place to drop documents.
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let read_dir = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut documents = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() || !is_document(&path) {
            continue;
        }
        documents.push(path);
    }

    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(dir = %dir.display(), count = documents.len(), "Documents discovered");
    Ok(documents)
}

fn is_document(path: &Path) -> bool {
    let has_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
    let is_lock_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(LOCK_FILE_PREFIX));
    has_extension && !is_lock_file
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn missing_directory_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("Documentações");
        let found = discover_documents(&dir).unwrap();
        assert!(dir.is_dir());
        assert!(found.is_empty());
    }

    #[test]
    fn only_docx_files_sorted_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.docx", "a.DOCX", "notes.txt", "c.doc", "~$b.docx"] {
            fs::write(tmp.path().join(name), "x").unwrap();
        }
        let found = discover_documents(tmp.path()).unwrap();
        assert_eq!(names(&found), ["a.DOCX", "b.docx"]);
    }

    #[test]
    fn scan_is_not_recursive() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("deep.docx"), "x").unwrap();
        fs::create_dir_all(tmp.path().join("folder.docx")).unwrap();
        fs::write(tmp.path().join("top.docx"), "x").unwrap();

        let found = discover_documents(tmp.path()).unwrap();
        assert_eq!(names(&found), ["top.docx"]);
    }
}
