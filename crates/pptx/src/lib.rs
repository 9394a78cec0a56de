//! PPTX (Office Open XML) reader and writer for the deck document tree.
//!
//! A .pptx file is a ZIP archive of XML parts. [`PptxParser`] loads one into a
//! [`deck_core::Document`]; [`PptxWriter`] saves a document, either as a new
//! package or by re-rendering only the changed slides of the package it was
//! loaded from.

pub mod package;
pub mod parser;
pub mod rels;
mod template;
pub mod writer;

pub use parser::PptxParser;
pub use writer::PptxWriter;

use deck_core::{Document, Result};
use std::path::Path;

/// Load a presentation from disk.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Document> {
    PptxParser::new().open(path)
}
