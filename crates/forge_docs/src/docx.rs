use std::path::{Path, PathBuf};

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};
use forge_qa::RequirementText;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse DOCX: {0}")]
    Parse(String),

    #[error("document contains no text")]
    Empty,
}

/// Source of requirement text for one document.
pub trait RequirementExtractor {
    fn extract(&self, path: &Path) -> Result<RequirementText, ExtractError>;
}

/// Reads the top-level body paragraphs of a `.docx` file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    /// Extract from an in-memory DOCX package.
    pub fn extract_bytes(bytes: &[u8]) -> Result<RequirementText, ExtractError> {
        let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::Parse(e.to_string()))?;

        let text = RequirementText::new(docx.document.children.iter().filter_map(|child| {
            match child {
                DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
                _ => None,
            }
        }));

        if text.is_empty() {
            return Err(ExtractError::Empty);
        }
        Ok(text)
    }
}

impl RequirementExtractor for DocxExtractor {
    fn extract(&self, path: &Path) -> Result<RequirementText, ExtractError> {
        info!(path = %path.display(), "Extracting requirement text");
        let bytes = std::fs::read(path).map_err(|source| ExtractError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::extract_bytes(&bytes)
    }
}

/// Concatenated text of a paragraph's runs; tabs and breaks kept as `\t` / `\n`.
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                match rc {
                    RunChild::Text(t) => out.push_str(&t.text),
                    RunChild::Tab(_) => out.push('\t'),
                    RunChild::Break(_) => out.push('\n'),
                    _ => {}
                }
            }
        }
    }
    out
}
