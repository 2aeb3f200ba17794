//! Document and node types with source metadata

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recognized file types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// HTML document
    Html,
    /// CSV file
    Csv,
    /// Source code file with language
    Code(String),
    /// Anything else, read as text
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            "html" | "htm" => Self::Html,
            "csv" => Self::Csv,
            "rs" => Self::Code("rust".to_string()),
            "py" => Self::Code("python".to_string()),
            "js" => Self::Code("javascript".to_string()),
            "ts" => Self::Code("typescript".to_string()),
            "go" => Self::Code("go".to_string()),
            "java" => Self::Code("java".to_string()),
            "c" | "h" => Self::Code("c".to_string()),
            "cpp" | "cc" | "cxx" => Self::Code("cpp".to_string()),
            "sh" | "bash" => Self::Code("bash".to_string()),
            "json" => Self::Code("json".to_string()),
            "toml" => Self::Code("toml".to_string()),
            "yaml" | "yml" => Self::Code("yaml".to_string()),
            _ => Self::Unknown,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Txt => "Text File",
            Self::Markdown => "Markdown",
            Self::Html => "HTML",
            Self::Csv => "CSV",
            Self::Code(lang) => lang.as_str(),
            Self::Unknown => "Unknown",
        }
    }
}

/// Metadata attached to every document and carried onto its nodes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    /// Full path of the source file
    pub file_path: String,
    /// File name without directories
    pub file_name: String,
    /// MIME type guessed from the extension
    pub file_type: String,
    /// File size in bytes
    pub file_size: u64,
    /// Last modification date (YYYY-MM-DD)
    pub last_modified_date: Option<String>,
    /// 1-based page label, PDFs only
    pub page_label: Option<String>,
}

impl DocumentMetadata {
    /// Short human-readable reference, e.g. `report.pdf, page 3`
    pub fn source_label(&self) -> String {
        match &self.page_label {
            Some(page) => format!("{}, page {}", self.file_name, page),
            None => self.file_name.clone(),
        }
    }
}

/// A loaded document: one file, or one page of a PDF
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Extracted text
    pub text: String,
    /// Detected file type
    pub file_type: FileType,
    /// SHA-256 of the extracted text
    pub content_hash: String,
    /// Source metadata
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a new document
    pub fn new(text: String, file_type: FileType, content_hash: String, metadata: DocumentMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            file_type,
            content_hash,
            metadata,
        }
    }
}

/// A chunk of a document; the unit that gets embedded and retrieved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextNode {
    /// Unique node ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Chunk text
    pub text: String,
    /// Metadata copied from the parent document
    pub metadata: DocumentMetadata,
    /// Character offset where the chunk starts in the document
    pub start_char_idx: usize,
    /// Character offset where the chunk ends in the document
    pub end_char_idx: usize,
}

impl TextNode {
    /// Create a new node for a document
    pub fn new(doc: &Document, text: String, start_char_idx: usize, end_char_idx: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id: doc.id,
            text,
            metadata: doc.metadata.clone(),
            start_char_idx,
            end_char_idx,
        }
    }

    /// Text sent to the LLM: source header followed by the chunk
    pub fn content_with_source(&self) -> String {
        format!("file_name: {}\n\n{}", self.metadata.source_label(), self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_extension("PDF"), FileType::Pdf);
        assert_eq!(FileType::from_extension("md"), FileType::Markdown);
        assert_eq!(FileType::from_extension("rs"), FileType::Code("rust".to_string()));
        assert_eq!(FileType::from_extension("xyz"), FileType::Unknown);
    }

    #[test]
    fn test_source_label_includes_page() {
        let mut metadata = DocumentMetadata {
            file_name: "guide.pdf".to_string(),
            ..Default::default()
        };
        assert_eq!(metadata.source_label(), "guide.pdf");

        metadata.page_label = Some("4".to_string());
        assert_eq!(metadata.source_label(), "guide.pdf, page 4");
    }
}
