//! Directory reader: turns a folder of files into documents

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::DataConfig;
use crate::error::{Error, Result};
use crate::types::{Document, DocumentMetadata, FileType};

use super::parser::FileParser;

/// Reads every supported file under a directory into [`Document`]s
#[derive(Debug, Clone)]
pub struct DirectoryReader {
    input_dir: PathBuf,
    recursive: bool,
    exclude_hidden: bool,
    required_exts: Vec<String>,
}

impl DirectoryReader {
    /// Reader over `input_dir` with default options (flat, hidden files skipped)
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            recursive: false,
            exclude_hidden: true,
            required_exts: Vec::new(),
        }
    }

    /// Reader configured from the `[data]` config section
    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(config.dir.clone())
            .recursive(config.recursive)
            .exclude_hidden(config.exclude_hidden)
            .required_exts(config.required_exts.clone())
    }

    /// Descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Skip dot-files and dot-directories
    pub fn exclude_hidden(mut self, exclude_hidden: bool) -> Self {
        self.exclude_hidden = exclude_hidden;
        self
    }

    /// Only accept these extensions; empty accepts all
    pub fn required_exts(mut self, exts: Vec<String>) -> Self {
        self.required_exts = exts
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// List the files that pass the filters, sorted by path
    pub fn input_files(&self) -> Result<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(Error::DirectoryNotFound(self.input_dir.clone()));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let exclude_hidden = self.exclude_hidden;

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.input_dir)
            .follow_links(true)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !(exclude_hidden && is_hidden(e)))
        {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if !self.has_required_ext(entry.path()) {
                tracing::debug!("Skipping {} (extension filter)", entry.path().display());
                continue;
            }
            files.push(entry.into_path());
        }

        if files.is_empty() {
            return Err(Error::NoFilesFound(self.input_dir.clone()));
        }

        Ok(files)
    }

    /// Load every file; PDFs yield one document per page
    pub fn load_data(&self) -> Result<Vec<Document>> {
        let files = self.input_files()?;
        tracing::info!("Loading {} files from {}", files.len(), self.input_dir.display());

        let mut documents = Vec::new();
        for path in files {
            let loaded = load_file(&path)?;
            tracing::debug!("Loaded {} ({} documents)", path.display(), loaded.len());
            documents.extend(loaded);
        }

        Ok(documents)
    }

    fn has_required_ext(&self, path: &Path) -> bool {
        if self.required_exts.is_empty() {
            return true;
        }
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.required_exts.contains(&ext))
    }
}

/// Parse one file into one or more documents
fn load_file(path: &Path) -> Result<Vec<Document>> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let data = std::fs::read(path)?;
    let parsed = FileParser::parse(&file_name, &data)?;
    tracing::debug!("Parsed {} as {}", file_name, parsed.file_type.display_name());
    let metadata = file_metadata(path, &file_name, data.len() as u64);

    if parsed.file_type == FileType::Pdf && !parsed.pages.is_empty() {
        return Ok(parsed
            .pages
            .into_iter()
            .map(|page| {
                let metadata = DocumentMetadata {
                    page_label: Some(page.page_number.to_string()),
                    ..metadata.clone()
                };
                let hash = parsed.content_hash.clone();
                Document::new(page.content, FileType::Pdf, hash, metadata)
            })
            .collect());
    }

    Ok(vec![Document::new(
        parsed.content,
        parsed.file_type,
        parsed.content_hash,
        metadata,
    )])
}

fn file_metadata(path: &Path, file_name: &str, file_size: u64) -> DocumentMetadata {
    let last_modified_date = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(|t| chrono::DateTime::<chrono::Utc>::from(t).format("%Y-%m-%d").to_string());

    DocumentMetadata {
        file_path: path.to_string_lossy().to_string(),
        file_name: file_name.to_string(),
        file_type: mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
        file_size,
        last_modified_date,
        page_label: None,
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn corpus() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "Rust is a systems language.").unwrap();
        fs::write(dir.path().join("a.md"), "# Ollama\nRuns models locally.").unwrap();
        fs::write(dir.path().join(".hidden.txt"), "secret").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), "Nested file.").unwrap();
        dir
    }

    #[test]
    fn test_flat_load_skips_hidden_and_nested() {
        let dir = corpus();
        let docs = DirectoryReader::new(dir.path()).load_data().unwrap();

        let names: Vec<_> = docs.iter().map(|d| d.metadata.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.md", "b.txt"]);
        assert_eq!(docs[1].text, "Rust is a systems language.");
        assert_eq!(docs[1].metadata.file_type, "text/plain");
        assert_eq!(docs[1].metadata.file_size, 27);
        assert!(docs[1].metadata.last_modified_date.is_some());
    }

    #[test]
    fn test_recursive_and_hidden_options() {
        let dir = corpus();
        let docs = DirectoryReader::new(dir.path())
            .recursive(true)
            .exclude_hidden(false)
            .load_data()
            .unwrap();

        let mut names: Vec<_> = docs.iter().map(|d| d.metadata.file_name.clone()).collect();
        names.sort();
        assert_eq!(names, vec![".hidden.txt", "a.md", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_required_exts_filter() {
        let dir = corpus();
        let docs = DirectoryReader::new(dir.path())
            .required_exts(vec![".MD".to_string()])
            .load_data()
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_type, FileType::Markdown);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = DirectoryReader::new(&missing).load_data().unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound(p) if p == missing));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".only-hidden"), "x").unwrap();
        let err = DirectoryReader::new(dir.path()).load_data().unwrap_err();
        assert!(matches!(err, Error::NoFilesFound(_)));
    }

    #[test]
    fn test_pdf_yields_one_document_per_page() {
        use crate::loader::parser::fixtures;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("guide.pdf"), fixtures::pdf(&["First page", "", "Third page"])).unwrap();
        fs::write(dir.path().join("notes.docx"), fixtures::docx(&["Docx body"])).unwrap();

        let docs = DirectoryReader::new(dir.path()).load_data().unwrap();
        assert_eq!(docs.len(), 3);

        let labels: Vec<_> = docs[..2].iter().map(|d| d.metadata.page_label.as_deref()).collect();
        assert_eq!(labels, vec![Some("1"), Some("3")]);
        assert!(docs[0].text.contains("First page"));
        assert!(docs[1].text.contains("Third page"));
        assert_eq!(docs[0].file_type, FileType::Pdf);
        assert_eq!(docs[0].metadata.file_type, "application/pdf");
        assert_eq!(docs[0].metadata.source_label(), "guide.pdf, page 1");

        assert_eq!(docs[2].file_type, FileType::Docx);
        assert_eq!(docs[2].metadata.page_label, None);
        assert!(docs[2].text.contains("Docx body"));
    }

    #[test]
    fn test_unparseable_file_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.pdf"), "not a pdf").unwrap();
        let err = DirectoryReader::new(dir.path()).load_data().unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
    }
}
