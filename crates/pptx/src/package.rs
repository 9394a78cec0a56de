//! ZIP container access: loading every part into memory and writing parts out.

use deck_core::types::SourcePackage;
use deck_core::{Error, Result};
use std::io::{Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Name of the content-types part, which must come first in the archive.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Load every file of a ZIP container.
pub fn read_package<R: Read + Seek>(reader: R) -> Result<SourcePackage> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

    let mut package = SourcePackage::default();
    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", index, e)))?;
        if file.is_dir() {
            continue;
        }

        let name = file.name().trim_start_matches('/').to_string();
        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
        package.parts.insert(name, content);
    }

    log::debug!("Loaded package with {} parts", package.parts.len());
    Ok(package)
}

/// A part decoded as UTF-8 text.
pub fn part_text(package: &SourcePackage, name: &str) -> Result<String> {
    let bytes = package
        .part(name)
        .ok_or_else(|| Error::MissingPart(name.to_string()))?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::XmlError(format!("Part '{}' is not UTF-8: {}", name, e)))
}

/// Streams parts into a new ZIP container.
pub struct PackageWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
}

impl<W: Write + Seek> PackageWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
        }
    }

    /// Add one deflated part.
    pub fn add(&mut self, name: &str, content: &[u8]) -> Result<()> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip
            .start_file(name, options)
            .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
        self.zip.write_all(content)?;
        Ok(())
    }

    /// Write the central directory and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish ZIP: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_write_then_read_parts() {
        let mut writer = PackageWriter::new(Cursor::new(Vec::new()));
        writer.add(CONTENT_TYPES_PART, b"<Types/>").unwrap();
        writer.add("ppt/slides/slide1.xml", "交接中心".as_bytes()).unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let package = read_package(Cursor::new(bytes)).unwrap();
        assert_eq!(package.parts.len(), 2);
        assert_eq!(part_text(&package, "ppt/slides/slide1.xml").unwrap(), "交接中心");
        assert!(matches!(
            part_text(&package, "ppt/presentation.xml"),
            Err(Error::MissingPart(_))
        ));
    }

    #[test]
    fn test_not_a_zip() {
        let result = read_package(Cursor::new(b"not a zip".to_vec()));
        assert!(matches!(result, Err(Error::ZipError(_))));
    }
}
