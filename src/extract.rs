//! Plain-text extraction for profile documents.
//!
//! Markdown and text files are read as UTF-8 (lossy). PDFs go through
//! `pdf-extract`; Word `.docx` files are unzipped and their `w:t` runs
//! concatenated, one paragraph per line.

use std::io::Read;
use std::path::Path;

use thiserror::Error;

/// Decompressed bytes read from a single ZIP entry.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

/// File extensions the profile loader picks up.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["md", "markdown", "txt", "pdf", "docx"];

/// Read `path` and return its text, dispatching on the file extension.
pub fn extract_file(path: &Path) -> Result<String, ExtractError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ExtractError::Unsupported(path.display().to_string()));
    }
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;
    extract_bytes(&bytes, &ext)
}

/// Extract text from in-memory `bytes` of the given extension.
pub fn extract_bytes(bytes: &[u8], ext: &str) -> Result<String, ExtractError> {
    match ext {
        "md" | "markdown" | "txt" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "pdf" => pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string())),
        "docx" => extract_docx(bytes),
        other => Err(ExtractError::Unsupported(other.to_string())),
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Docx(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }
    docx_paragraphs(&xml)
}

fn docx_paragraphs(xml: &[u8]) -> Result<String, ExtractError> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let line = current.trim();
                    if !line.is_empty() {
                        paragraphs.push(line.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| ExtractError::Docx(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let tail = current.trim();
    if !tail.is_empty() {
        paragraphs.push(tail.to_string());
    }
    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx(body: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            let xml = format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
                body
            );
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let bytes = docx(
            "<w:p><w:r><w:t>Senior Data Engineer</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Cut costs </w:t></w:r><w:r><w:t xml:space=\"preserve\">by 30% &amp; more</w:t></w:r></w:p>",
        );
        let text = extract_bytes(&bytes, "docx").unwrap();
        assert_eq!(text, "Senior Data Engineer\nCut costs by 30% & more");
    }

    #[test]
    fn test_docx_without_document_xml_fails() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            zip.start_file("other.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"<x/>").unwrap();
            zip.finish().unwrap();
        }
        assert!(matches!(
            extract_bytes(&buf, "docx"),
            Err(ExtractError::Docx(_))
        ));
    }

    #[test]
    fn test_text_files_and_unsupported_extensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let md = tmp.path().join("cv.MD");
        std::fs::write(&md, "# CV\n\nPython").unwrap();
        assert_eq!(extract_file(&md).unwrap(), "# CV\n\nPython");

        let png = tmp.path().join("photo.png");
        std::fs::write(&png, [0u8, 1, 2]).unwrap();
        assert!(matches!(
            extract_file(&png),
            Err(ExtractError::Unsupported(_))
        ));

        assert!(matches!(
            extract_bytes(b"not a pdf", "pdf"),
            Err(ExtractError::Pdf(_))
        ));
    }
}
