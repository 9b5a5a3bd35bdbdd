//! Text and document extraction (§4.A).
//!
//! Covers PDF (text-layer only), DOCX, Markdown, HTML, and all
//! plain-structured formats (TXT, LOG, JSON, CSV, XML, YAML, INI/CFG/CONF),
//! which are all read as opaque Unicode via the same encoding-detection
//! fallback chain.

use std::path::Path;

use super::{extension_of, ExtractionOutcome};

/// A struct for extracting text from plain and lightly-structured files.
pub struct TextExtractor;

impl TextExtractor {
    /// Decodes bytes to a Unicode string, trying `utf-8`, then `utf-16`,
    /// then `latin-1` (§4.A). `latin-1` never fails, so this always
    /// terminates with a best-effort string rather than an error.
    pub fn decode_bytes(bytes: &[u8]) -> String {
        if let Ok(text) = std::str::from_utf8(bytes) {
            return text.to_string();
        }
        if bytes.len() % 2 == 0 {
            let utf16_units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
            if let Ok(text) = String::from_utf16(&utf16_units) {
                return text;
            }
        }
        bytes.iter().map(|&b| b as char).collect()
    }

    pub fn extract_plain<T: AsRef<Path>>(file_path: T) -> ExtractionOutcome<String> {
        match std::fs::read(file_path.as_ref()) {
            Ok(bytes) => ExtractionOutcome::ok(Self::decode_bytes(&bytes)),
            Err(e) => ExtractionOutcome::failed(e.to_string()),
        }
    }

    pub fn extract_pdf<T: AsRef<Path>>(file_path: T) -> ExtractionOutcome<String> {
        match pdf_extract::extract_text(file_path.as_ref()) {
            // A scanned PDF with no text layer yields an empty string; that
            // is a successful extraction of nothing, not a failure (§4.A).
            Ok(text) => ExtractionOutcome::ok(text),
            Err(e) => ExtractionOutcome::failed(e.to_string()),
        }
    }

    pub fn extract_docx<T: AsRef<Path>>(file_path: T) -> ExtractionOutcome<String> {
        let docs = docx_parser::MarkdownDocument::from_file(file_path.as_ref());
        ExtractionOutcome::ok(docs.to_markdown(false))
    }

    pub fn extract_markdown<T: AsRef<Path>>(file_path: T) -> ExtractionOutcome<String> {
        match std::fs::read(file_path.as_ref()) {
            Ok(bytes) => {
                let raw = Self::decode_bytes(&bytes);
                ExtractionOutcome::ok(markdown_to_text::convert(&raw))
            }
            Err(e) => ExtractionOutcome::failed(e.to_string()),
        }
    }

    pub fn extract_html<T: AsRef<Path>>(file_path: T) -> ExtractionOutcome<String> {
        match std::fs::read(file_path.as_ref()) {
            Ok(bytes) => {
                let raw = Self::decode_bytes(&bytes);
                let document = scraper::Html::parse_document(&raw);
                let body_selector = scraper::Selector::parse("body").unwrap_or_else(|_| scraper::Selector::parse("html").unwrap());
                let text = document
                    .select(&body_selector)
                    .next()
                    .map(|el| el.text().collect::<Vec<_>>().join(" "))
                    .unwrap_or(raw);
                ExtractionOutcome::ok(text)
            }
            Err(e) => ExtractionOutcome::failed(e.to_string()),
        }
    }

    /// Dispatches to the right parser by extension. Extensions with no
    /// dedicated parser (`.json`, `.csv`, `.xml`, `.yaml`, `.yml`, `.ini`,
    /// `.cfg`, `.conf`) are read as plain text; the classifier, not the
    /// extractor, is responsible for interpreting their structure.
    pub fn extract<T: AsRef<Path>>(file_path: T) -> ExtractionOutcome<String> {
        let path = file_path.as_ref();
        match extension_of(path).as_str() {
            "pdf" => Self::extract_pdf(path),
            "docx" => Self::extract_docx(path),
            "md" => Self::extract_markdown(path),
            "html" | "htm" => Self::extract_html(path),
            _ => Self::extract_plain(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn decodes_valid_utf8() {
        assert_eq!(TextExtractor::decode_bytes("hello".as_bytes()), "hello");
    }

    #[test]
    fn decodes_latin1_as_last_resort() {
        let bytes = vec![0xE9, 0x20, 0x61]; // invalid utf-8, invalid utf-16
        let decoded = TextExtractor::decode_bytes(&bytes);
        assert_eq!(decoded.chars().count(), 3);
    }

    #[test]
    fn extract_plain_round_trips_file_contents() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "hello world").unwrap();
        let outcome = TextExtractor::extract_plain(file.path());
        assert_eq!(outcome.payload.unwrap(), "hello world");
    }

    #[test]
    fn extract_html_pulls_body_text() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "<html><body><p>Hello</p></body></html>").unwrap();
        let path = file.path().with_extension("html");
        std::fs::rename(file.path(), &path).unwrap();
        let outcome = TextExtractor::extract_html(&path);
        assert!(outcome.payload.unwrap().contains("Hello"));
        let _ = std::fs::remove_file(&path);
    }
}
