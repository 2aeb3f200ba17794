//! Multi-format file parser

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::FileType;

/// Parsed file with extracted text
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// File type
    pub file_type: FileType,
    /// Extracted text content
    pub content: String,
    /// Content hash
    pub content_hash: String,
    /// Page-level content; empty for formats without pages
    pub pages: Vec<PageContent>,
}

/// Content from a single page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Text content of the page
    pub content: String,
    /// Character offset in full document
    pub char_offset: usize,
}

/// Multi-format file parser
pub struct FileParser;

impl FileParser {
    /// Parse a file based on its extension
    ///
    /// Unrecognized extensions are read as (lossy) UTF-8 text.
    pub fn parse(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let extension = std::path::Path::new(filename)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match FileType::from_extension(&extension) {
            FileType::Pdf => Self::parse_pdf(filename, data),
            FileType::Docx => Self::parse_docx(filename, data),
            FileType::Html => Self::parse_html(filename, data),
            FileType::Csv => Self::parse_csv(filename, data),
            file_type => Ok(Self::parse_text(data, file_type)),
        }
    }

    /// Parse PDF document page by page
    fn parse_pdf(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        let mut content = String::new();
        let mut pages = Vec::new();

        for page_number in doc.get_pages().keys() {
            let text = match doc.extract_text(&[*page_number]) {
                Ok(text) => cleanup_pdf_text(&text),
                Err(e) => {
                    tracing::debug!("Could not extract page {} of {}: {}", page_number, filename, e);
                    continue;
                }
            };

            if text.trim().is_empty() {
                continue;
            }

            pages.push(PageContent {
                page_number: *page_number,
                content: text.clone(),
                char_offset: content.chars().count(),
            });
            content.push_str(&text);
            content.push('\n');
        }

        if pages.is_empty() {
            // Some encodings defeat lopdf's per-page extraction
            tracing::warn!("Per-page extraction found no text in {}, trying whole-document pass", filename);
            let text = pdf_extract::extract_text_from_mem(data)
                .map_err(|e| Error::file_parse(filename, e.to_string()))?;
            content = cleanup_pdf_text(&text);
        }

        if content.trim().is_empty() {
            return Err(Error::file_parse(
                filename,
                "No text content could be extracted from PDF",
            ));
        }

        Ok(ParsedDocument {
            file_type: FileType::Pdf,
            content_hash: hash_content(&content),
            content,
            pages,
        })
    }

    /// Parse DOCX document
    fn parse_docx(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut content = String::new();

        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                content.push_str(&t.text);
                            }
                        }
                    }
                }
                content.push('\n');
            }
        }

        Ok(ParsedDocument {
            file_type: FileType::Docx,
            content_hash: hash_content(&content),
            content,
            pages: Vec::new(),
        })
    }

    /// Parse HTML document (visible body text)
    fn parse_html(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let html = String::from_utf8_lossy(data);
        let document = scraper::Html::parse_document(&html);
        let body_selector = scraper::Selector::parse("body")
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut content = String::new();
        let root = document
            .select(&body_selector)
            .next()
            .unwrap_or_else(|| document.root_element());

        for text in root.text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if !content.is_empty() {
                    content.push(' ');
                }
                content.push_str(trimmed);
            }
        }

        Ok(ParsedDocument {
            file_type: FileType::Html,
            content_hash: hash_content(&content),
            content,
            pages: Vec::new(),
        })
    }

    /// Parse CSV file into `a | b | c` rows; a malformed row fails the parse
    fn parse_csv(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let mut reader = csv::Reader::from_reader(data);
        let mut content = String::new();

        let headers = reader
            .headers()
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;
        content.push_str(&headers.iter().collect::<Vec<_>>().join(" | "));
        content.push('\n');

        for record in reader.records() {
            let record = record.map_err(|e| Error::file_parse(filename, e.to_string()))?;
            content.push_str(&record.iter().collect::<Vec<_>>().join(" | "));
            content.push('\n');
        }

        Ok(ParsedDocument {
            file_type: FileType::Csv,
            content_hash: hash_content(&content),
            content,
            pages: Vec::new(),
        })
    }

    /// Parse plain text, markdown, code, or an unknown format
    fn parse_text(data: &[u8], file_type: FileType) -> ParsedDocument {
        let content = String::from_utf8_lossy(data).to_string();

        ParsedDocument {
            file_type,
            content_hash: hash_content(&content),
            content,
            pages: Vec::new(),
        }
    }
}

/// Normalize typographic characters and drop blank lines from PDF text
fn cleanup_pdf_text(text: &str) -> String {
    text.replace('\0', "")
        .replace(['\u{2010}', '\u{2011}', '\u{2013}'], "-")
        .replace('\u{2014}', "--")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace('\u{2022}', "* ")
        .replace('\u{2026}', "...")
        .replace('\u{00A0}', " ")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB00}', "ff")
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// SHA-256 of the content, hex encoded
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// In-memory PDF and DOCX files for tests
#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// PDF with one page per entry; an empty entry gives a page with no text
    pub(crate) fn pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations }.encode().unwrap();
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => pages.len() as i64,
                "Kids" => kids,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    /// DOCX with one paragraph per entry
    pub(crate) fn docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = docx_rs::Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*text)),
            );
        }

        let mut cursor = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }
}
