use crate::decode::{ExtractionError, TextExtractor};
use lopdf::Document;
use tracing::{debug, info, warn};

/// Extracts the text of a PDF report.
///
/// Each page is extracted on its own and the pages are joined with a space, so a name at the end
/// of one page and a number at the start of the next are still adjacent. Matching only starts
/// once every page has been read.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| ExtractionError::Unreadable(format!("Failed to parse PDF: {e}")))?;

        let pages = doc.get_pages();
        let mut page_texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => page_texts.push(text),
                Err(e) => warn!("Unable to extract text from page {page_number}: {e}"),
            }
        }
        let mut text = page_texts.join(" ");

        if !has_text(&text) {
            debug!("Per-page extraction found no text, trying the whole document");
            text = pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| ExtractionError::Unreadable(format!("Failed to extract text: {e}")))?;
        }

        if !has_text(&text) {
            return Err(ExtractionError::NoText);
        }
        info!(pages = pages.len(), chars = text.len(), "Extracted report text");
        Ok(text)
    }
}

/// Reads a report that is already plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ExtractionError::Unreadable(format!("The report is not UTF-8: {e}")))?;
        if !has_text(text) {
            return Err(ExtractionError::NoText);
        }
        Ok(text.to_string())
    }
}

fn has_text(text: &str) -> bool {
    text.chars().any(|c| !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let text = PlainTextExtractor.extract(b"Widget A 12\nWidget B 7").unwrap();
        assert_eq!(text, "Widget A 12\nWidget B 7");
    }

    #[test]
    fn test_plain_text_blank() {
        assert!(matches!(
            PlainTextExtractor.extract(b" \n\t "),
            Err(ExtractionError::NoText)
        ));
    }

    #[test]
    fn test_plain_text_not_utf8() {
        assert!(matches!(
            PlainTextExtractor.extract(b"\xFF\xFE"),
            Err(ExtractionError::Unreadable(_))
        ));
    }

    #[test]
    fn test_pdf_garbage() {
        assert!(matches!(
            PdfExtractor.extract(b"not a pdf"),
            Err(ExtractionError::Unreadable(_))
        ));
    }
}
