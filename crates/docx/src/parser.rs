//! DOCX file parser implementation.

use deck_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Read, Seek};
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Parser for DOCX (Office Open XML) files.
pub struct DocxParser;

impl DocxParser {
    /// Create a new DOCX parser.
    pub fn new() -> Self {
        Self
    }

    /// Text of every paragraph, in document order. Empty paragraphs are kept.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Vec<String>> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;
        let content = self.read_file_from_archive(&mut archive, DOCUMENT_PART)?;
        let paragraphs = self.extract_paragraphs(&content)?;
        log::debug!("Read {} paragraphs from {}", paragraphs.len(), DOCUMENT_PART);
        Ok(paragraphs)
    }

    /// Paragraphs with visible text, trimmed.
    pub fn parse_non_empty<R: Read + Seek>(&self, reader: R) -> Result<Vec<String>> {
        Ok(self
            .parse(reader)?
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect())
    }

    /// Walk `w:p` elements collecting `w:t` text, with `w:tab` as a tab and
    /// `w:br`/`w:cr` as a newline. Tab stops in paragraph properties are not
    /// text and are skipped.
    fn extract_paragraphs(&self, xml_content: &str) -> Result<Vec<String>> {
        let mut reader = Reader::from_str(xml_content);
        reader.trim_text(false);

        let mut paragraphs = Vec::new();
        let mut current: Option<String> = None;
        let mut in_text = false;
        let mut in_run = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                    b"p" => current = Some(String::new()),
                    b"r" => in_run = true,
                    b"t" => in_text = true,
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                    b"p" => paragraphs.push(String::new()),
                    b"tab" if in_run => push(&mut current, "\t"),
                    b"br" | b"cr" if in_run => push(&mut current, "\n"),
                    _ => {}
                },
                Ok(Event::Text(ref e)) => {
                    if in_text {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::DocxParseError(format!("Bad text: {}", e)))?;
                        push(&mut current, &text);
                    }
                }
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"p" => {
                        if let Some(paragraph) = current.take() {
                            paragraphs.push(paragraph);
                        }
                    }
                    b"r" => in_run = false,
                    b"t" => in_text = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::DocxParseError(format!(
                        "Error parsing {}: {}",
                        DOCUMENT_PART, e
                    )));
                }
                _ => {}
            }
        }

        Ok(paragraphs)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::MissingPart(format!("{}: {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

fn push(current: &mut Option<String>, text: &str) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.push_str(text);
    }
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>2025 年终总结</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:r><w:t xml:space="preserve">交接中心 </w:t></w:r><w:r><w:tab/><w:t>247人天</w:t></w:r></w:p>
    <w:p><w:r><w:t>line one</w:t><w:br/><w:t>line two &amp; more</w:t></w:r></w:p>
    <w:p><w:pPr><w:pStyle w:val="Normal"/><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr></w:p>
  </w:body>
</w:document>"#;

    fn docx(document: &str) -> Cursor<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(DOCUMENT_PART, FileOptions::default()).unwrap();
        zip.write_all(document.as_bytes()).unwrap();
        let bytes = zip.finish().unwrap().into_inner();
        Cursor::new(bytes)
    }

    #[test]
    fn test_paragraphs_with_tabs_and_breaks() {
        let paragraphs = DocxParser::new().parse(docx(DOCUMENT)).unwrap();
        assert_eq!(
            paragraphs,
            vec![
                "2025 年终总结",
                "",
                "交接中心 \t247人天",
                "line one\nline two & more",
                "",
            ]
        );
    }

    #[test]
    fn test_non_empty_paragraphs() {
        let paragraphs = DocxParser::new().parse_non_empty(docx(DOCUMENT)).unwrap();
        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[1], "交接中心 \t247人天");
    }

    #[test]
    fn test_missing_document_part() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/styles.xml", FileOptions::default()).unwrap();
        zip.write_all(b"<w:styles/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let result = DocxParser::new().parse(Cursor::new(bytes));
        assert!(matches!(result, Err(Error::MissingPart(_))));
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"w:p"), b"p");
        assert_eq!(local_name(b"p"), b"p");
    }
}
