//! PDF collaborator contract and study-context assembly.
//!
//! Extraction itself is an external collaborator consumed through
//! [`TextExtractor`]; this module owns what happens to its output: joining
//! page text into a context string and clipping it to the fixed budget
//! before it is sent to the chat collaborator. Extraction failure yields
//! empty text and the session continues.

use serde::{Deserialize, Serialize};

use crate::error::PdfError;

/// Character budget for PDF context embedded in a chat prompt.
pub const CONTEXT_BUDGET_CHARS: usize = 4000;

/// Extraction result: page count plus concatenated text runs per page.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    pub page_count: usize,
    pub pages: Vec<String>,
}

/// External text-extraction collaborator.
pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument, PdfError>;
}

/// Study-material context attached to assistant questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfContext {
    pub filename: String,
    pub text: String,
}

impl PdfContext {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }

    pub fn from_document(filename: impl Into<String>, document: &ExtractedDocument) -> Self {
        Self::new(filename, document.pages.join("\n\n"))
    }

    /// Run the extractor over raw bytes. Failure is logged and yields empty
    /// text rather than an error -- a broken PDF never interrupts a session.
    pub fn from_bytes(
        filename: impl Into<String>,
        bytes: &[u8],
        extractor: &dyn TextExtractor,
    ) -> Self {
        let filename = filename.into();
        match extractor.extract(bytes) {
            Ok(document) => Self::from_document(filename, &document),
            Err(err) => {
                tracing::warn!(error = %err, file = %filename, "PDF extraction failed");
                Self::new(filename, "")
            }
        }
    }

    /// Context text clipped to [`CONTEXT_BUDGET_CHARS`].
    pub fn clipped(&self) -> &str {
        self.clipped_to(CONTEXT_BUDGET_CHARS)
    }

    /// Clip on a character boundary so multibyte text never splits.
    pub fn clipped_to(&self, budget: usize) -> &str {
        match self.text.char_indices().nth(budget) {
            Some((index, _)) => &self.text[..index],
            None => &self.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedExtractor(Result<ExtractedDocument, PdfError>);

    impl TextExtractor for FixedExtractor {
        fn extract(&self, _bytes: &[u8]) -> Result<ExtractedDocument, PdfError> {
            match &self.0 {
                Ok(doc) => Ok(ExtractedDocument {
                    page_count: doc.page_count,
                    pages: doc.pages.clone(),
                }),
                Err(PdfError::ExtractionFailed(msg)) => {
                    Err(PdfError::ExtractionFailed(msg.clone()))
                }
            }
        }
    }

    #[test]
    fn pages_join_with_blank_lines() {
        let doc = ExtractedDocument {
            page_count: 2,
            pages: vec!["page one".to_string(), "page two".to_string()],
        };
        let context = PdfContext::from_document("doc.pdf", &doc);
        assert_eq!(context.text, "page one\n\npage two");
    }

    #[test]
    fn extraction_failure_yields_empty_text() {
        let extractor = FixedExtractor(Err(PdfError::ExtractionFailed("bad xref".to_string())));
        let context = PdfContext::from_bytes("broken.pdf", b"%PDF-", &extractor);
        assert_eq!(context.filename, "broken.pdf");
        assert!(context.text.is_empty());
    }

    #[test]
    fn clipping_honors_the_budget() {
        let context = PdfContext::new("big.pdf", "a".repeat(5000));
        assert_eq!(context.clipped().chars().count(), CONTEXT_BUDGET_CHARS);

        let short = PdfContext::new("small.pdf", "tiny");
        assert_eq!(short.clipped(), "tiny");
    }

    #[test]
    fn clipping_respects_char_boundaries() {
        let context = PdfContext::new("utf8.pdf", "é".repeat(10));
        assert_eq!(context.clipped_to(3), "ééé");
    }
}
