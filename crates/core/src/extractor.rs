use crate::error::{ExtractError, Result};
use crate::models::FormatTag;
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};
use lopdf::Document;
use std::collections::HashMap;
use std::path::Path;

pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Page-by-page PDF text, pages joined with `\n`.
///
/// Pages without a text layer (scans, blank pages) or with undecodable
/// content streams contribute an empty line instead of failing the document.
#[derive(Debug, Default)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let document =
            Document::load_mem(bytes).map_err(|error| ExtractError::PdfParse(error.to_string()))?;

        let pages = document
            .get_pages()
            .into_keys()
            .map(|page_no| match document.extract_text(&[page_no]) {
                Ok(text) => text,
                Err(error) => {
                    tracing::debug!(page = page_no, %error, "page has no extractable text");
                    String::new()
                }
            })
            .collect::<Vec<_>>();

        Ok(pages.join("\n"))
    }
}

/// Body paragraphs of a Word document, joined with `\n`.
#[derive(Debug, Default)]
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let docx =
            docx_rs::read_docx(bytes).map_err(|error| ExtractError::DocxParse(error.to_string()))?;

        let paragraphs = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
                _ => None,
            })
            .collect::<Vec<_>>();

        Ok(paragraphs.join("\n"))
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_paragraph_children(&paragraph.children, &mut text);
    text
}

fn push_paragraph_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(value) => text.push_str(&value.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, text),
            _ => {}
        }
    }
}

/// Format tag → extractor. Unknown tags extract to an empty string.
pub struct ExtractorRegistry {
    extractors: HashMap<FormatTag, Box<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    pub fn register(&mut self, format: FormatTag, extractor: impl TextExtractor + 'static) {
        self.extractors.insert(format, Box::new(extractor));
    }

    pub fn supports(&self, format: &FormatTag) -> bool {
        self.extractors.contains_key(format)
    }

    pub fn extract(&self, format: Option<&FormatTag>, bytes: &[u8]) -> Result<String> {
        match format.and_then(|tag| self.extractors.get(tag)) {
            Some(extractor) => extractor.extract(bytes),
            None => Ok(String::new()),
        }
    }

    /// Reads `path` and extracts it according to its extension.
    pub fn extract_path(&self, path: &Path) -> Result<String> {
        let format = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(FormatTag::from_filename);

        match format {
            Some(tag) if self.supports(&tag) => {
                let bytes = std::fs::read(path)?;
                self.extract(Some(&tag), &bytes)
            }
            _ => Ok(String::new()),
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(FormatTag::pdf(), LopdfExtractor);
        registry.register(FormatTag::docx(), DocxExtractor);
        registry
    }
}
