use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::rag::Document;

const SUPPORTED_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Load every supported file under `paths`.
///
/// Directories are walked recursively. Unreadable or unsupported files are
/// logged and skipped so one bad file never blocks ingestion.
pub fn load_documents(paths: &[PathBuf]) -> Vec<Document> {
    let mut documents = Vec::new();

    for path in paths {
        if path.is_file() {
            documents.extend(load_file(path));
        } else if path.is_dir() {
            documents.extend(load_directory(path));
        } else {
            warn!("Path not found: {:?}", path);
        }
    }

    info!("Loaded {} documents", documents.len());
    documents
}

fn load_directory(dir: &Path) -> Vec<Document> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Error walking {:?}: {}", dir, e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| file_kind(path) != FileKind::Other)
        .collect();
    files.sort();

    files.iter().filter_map(|path| load_file(path)).collect()
}

fn load_file(path: &Path) -> Option<Document> {
    match file_kind(path) {
        FileKind::Text => {}
        FileKind::Pdf => {
            warn!("PDF ingestion is not supported, skipping {:?}", path);
            return None;
        }
        FileKind::Other => {
            warn!("Unsupported file type: {:?}", path);
            return None;
        }
    }

    match std::fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => None,
        Ok(content) => Some(Document::new(content, path.display().to_string())),
        Err(e) => {
            warn!("Error loading file {:?}: {}", path, e);
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Text,
    /// Reported by name so directory walks say why the file was left out
    Pdf,
    Other,
}

fn file_kind(path: &Path) -> FileKind {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext) => FileKind::Text,
        Some("pdf") => FileKind::Pdf,
        _ => FileKind::Other,
    }
}
