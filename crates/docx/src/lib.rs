//! DOCX (Office Open XML) paragraph text reader.
//!
//! Used to pull reference material out of word-processing documents; only the
//! text of body paragraphs is read.

pub mod parser;

pub use parser::DocxParser;
