//! Domain types for the in-memory document tree.
//!
//! A [`Document`] owns its [`Slide`]s, a slide owns its [`Shape`]s, and a
//! shape's optional [`TextFrame`] holds [`Paragraph`]s of [`Run`]s. Documents
//! loaded from a file also keep the markup they were parsed from so that
//! anything left untouched is written back byte for byte.

use crate::error::{Error, Result};
use crate::style::TextStyle;
use crate::units::{Emu, Rect, Rgb};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Index of the "Title Slide" layout in the standard catalogue.
pub const LAYOUT_TITLE_SLIDE: usize = 0;
/// Index of the "Title and Content" layout in the standard catalogue.
pub const LAYOUT_TITLE_AND_CONTENT: usize = 1;
/// Index of the "Title Only" layout in the standard catalogue.
pub const LAYOUT_TITLE_ONLY: usize = 5;
/// Index of the "Blank" layout in the standard catalogue.
pub const LAYOUT_BLANK: usize = 6;

/// The kind of file a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    /// Office Open XML presentation (.pptx).
    Presentation,
    /// Office Open XML word-processing document (.docx).
    WordProcessing,
}

impl FileFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Presentation),
            "docx" => Some(Self::WordProcessing),
            _ => None,
        }
    }

    /// Whether the bytes start like a ZIP container, which both formats are.
    pub fn is_zip_container(bytes: &[u8]) -> bool {
        bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04])
    }
}

/// All parts of the container a document was loaded from, keyed by part name.
#[derive(Debug, Clone, Default)]
pub struct SourcePackage {
    pub parts: BTreeMap<String, Vec<u8>>,
}

impl SourcePackage {
    /// Look up a part by name (no leading slash).
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(|p| p.as_slice())
    }
}

/// An in-memory presentation.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub slide_width: Emu,
    pub slide_height: Emu,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,

    /// Layouts new slides can be based on.
    pub layouts: Vec<Layout>,

    #[serde(skip)]
    source: Option<SourcePackage>,
}

impl Document {
    /// Create an empty document with the standard layout catalogue.
    pub fn new(slide_width: Emu, slide_height: Emu) -> Self {
        Self {
            slide_width,
            slide_height,
            slides: Vec::new(),
            layouts: Layout::standard_set(slide_width, slide_height),
            source: None,
        }
    }

    /// Create a document backed by the package it was read from.
    pub fn from_source(
        slide_width: Emu,
        slide_height: Emu,
        layouts: Vec<Layout>,
        source: SourcePackage,
    ) -> Self {
        Self {
            slide_width,
            slide_height,
            slides: Vec::new(),
            layouts,
            source: Some(source),
        }
    }

    /// The package this document was loaded from, if any.
    pub fn source(&self) -> Option<&SourcePackage> {
        self.source.as_ref()
    }

    /// Append a slide based on a layout, creating the layout's placeholders.
    ///
    /// Fails with [`Error::LayoutNotFound`] when the layout index does not exist.
    pub fn add_slide(&mut self, layout: usize) -> Result<&mut Slide> {
        let definition = self.layouts.get(layout).ok_or(Error::LayoutNotFound {
            index: layout,
            available: self.layouts.len(),
        })?;

        let mut slide = Slide::new(layout);
        for placeholder in &definition.placeholders {
            let id = slide.next_shape_id();
            let name = format!("{} {}", placeholder.kind.display_name(), id - 1);
            let mut shape = Shape::placeholder(id, placeholder.kind.clone(), placeholder.idx);
            shape.name = name;
            shape.frame = Some(placeholder.frame);
            slide.shapes.push(shape);
        }

        self.slides.push(slide);
        let last = self.slides.len() - 1;
        Ok(&mut self.slides[last])
    }
}

/// A slide layout: a name and the placeholders it provides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub name: String,
    pub placeholders: Vec<LayoutPlaceholder>,
}

/// A placeholder position defined by a layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPlaceholder {
    pub kind: PlaceholderKind,
    pub idx: u32,
    pub frame: Rect,
}

impl Layout {
    /// The standard catalogue: Title Slide, Title and Content, Section Header,
    /// Two Content, Comparison, Title Only, Blank.
    pub fn standard_set(width: Emu, height: Emu) -> Vec<Layout> {
        let w = width.get();
        let h = height.get();
        let margin = w / 18;
        let inner = w - 2 * margin;
        let half = (inner - margin / 2) / 2;
        let title = Rect::new(Emu(margin), Emu(h / 20), Emu(inner), Emu(h * 6 / 32));
        let body = Rect::new(Emu(margin), Emu(h * 8 / 30), Emu(inner), Emu(h * 19 / 30));

        let ph = |kind: PlaceholderKind, idx: u32, frame: Rect| LayoutPlaceholder { kind, idx, frame };
        let layout = |name: &str, placeholders: Vec<LayoutPlaceholder>| Layout {
            name: name.to_string(),
            placeholders,
        };

        vec![
            layout(
                "Title Slide",
                vec![
                    ph(
                        PlaceholderKind::CenterTitle,
                        0,
                        Rect::new(Emu(w / 12), Emu(h * 10 / 32), Emu(w * 10 / 12), Emu(h * 7 / 32)),
                    ),
                    ph(
                        PlaceholderKind::Subtitle,
                        1,
                        Rect::new(Emu(w / 6), Emu(h * 18 / 32), Emu(w * 4 / 6), Emu(h * 8 / 32)),
                    ),
                ],
            ),
            layout(
                "Title and Content",
                vec![ph(PlaceholderKind::Title, 0, title), ph(PlaceholderKind::Object, 1, body)],
            ),
            layout(
                "Section Header",
                vec![
                    ph(
                        PlaceholderKind::Title,
                        0,
                        Rect::new(Emu(margin), Emu(h * 12 / 32), Emu(inner), Emu(h * 6 / 32)),
                    ),
                    ph(
                        PlaceholderKind::Body,
                        1,
                        Rect::new(Emu(margin), Emu(h * 19 / 32), Emu(inner), Emu(h * 4 / 32)),
                    ),
                ],
            ),
            layout(
                "Two Content",
                vec![
                    ph(PlaceholderKind::Title, 0, title),
                    ph(
                        PlaceholderKind::Object,
                        1,
                        Rect::new(body.left, body.top, Emu(half), body.height),
                    ),
                    ph(
                        PlaceholderKind::Object,
                        2,
                        Rect::new(Emu(w - margin - half), body.top, Emu(half), body.height),
                    ),
                ],
            ),
            layout(
                "Comparison",
                vec![
                    ph(PlaceholderKind::Title, 0, title),
                    ph(
                        PlaceholderKind::Body,
                        1,
                        Rect::new(body.left, body.top, Emu(half), Emu(h / 12)),
                    ),
                    ph(
                        PlaceholderKind::Object,
                        2,
                        Rect::new(body.left, Emu(body.top.get() + h / 12), Emu(half), Emu(body.height.get() - h / 12)),
                    ),
                    ph(
                        PlaceholderKind::Body,
                        3,
                        Rect::new(Emu(w - margin - half), body.top, Emu(half), Emu(h / 12)),
                    ),
                    ph(
                        PlaceholderKind::Object,
                        4,
                        Rect::new(
                            Emu(w - margin - half),
                            Emu(body.top.get() + h / 12),
                            Emu(half),
                            Emu(body.height.get() - h / 12),
                        ),
                    ),
                ],
            ),
            layout("Title Only", vec![ph(PlaceholderKind::Title, 0, title)]),
            layout("Blank", Vec::new()),
        ]
    }

    /// Find the placeholder a slide placeholder inherits from: by index first, then by kind.
    pub fn inherited_frame(&self, kind: &PlaceholderKind, idx: u32) -> Option<Rect> {
        self.placeholders
            .iter()
            .find(|p| p.idx == idx && idx != 0)
            .or_else(|| self.placeholders.iter().find(|p| p.kind.same_family(kind)))
            .map(|p| p.frame)
    }
}

/// Markup a slide was parsed from, with the byte range of its shape list.
#[derive(Debug, Clone)]
pub struct SlideMarkup {
    pub xml: String,
    /// Range inside `xml` covering every shape in the shape tree.
    pub shapes: Range<usize>,
}

/// One page of a document.
#[derive(Debug, Clone, Serialize)]
pub struct Slide {
    /// Index into the document's layout list.
    pub layout: usize,

    /// Shapes in z-order.
    pub shapes: Vec<Shape>,

    /// Part name inside the source package (`ppt/slides/slide3.xml`).
    pub part_name: Option<String>,

    #[serde(skip)]
    pub markup: Option<SlideMarkup>,
}

impl Slide {
    /// Create an empty slide based on a layout.
    pub fn new(layout: usize) -> Self {
        Self {
            layout,
            shapes: Vec::new(),
            part_name: None,
            markup: None,
        }
    }

    /// Text of the first title placeholder.
    pub fn title(&self) -> Option<String> {
        self.shapes
            .iter()
            .find(|s| s.is_title())
            .map(|s| s.text())
    }

    /// The smallest shape id not yet used on this slide (id 1 is the shape tree itself).
    pub fn next_shape_id(&self) -> u32 {
        self.shapes.iter().map(|s| s.id).max().unwrap_or(1).max(1) + 1
    }

    /// Append a shape and return it for further configuration.
    pub fn add_shape(&mut self, shape: Shape) -> &mut Shape {
        self.shapes.push(shape);
        let last = self.shapes.len() - 1;
        &mut self.shapes[last]
    }

    /// Append an empty text box.
    pub fn add_text_box(&mut self, frame: Rect) -> &mut Shape {
        let shape = Shape::text_box(self.next_shape_id(), frame);
        self.add_shape(shape)
    }

    /// Append a filled rectangle without text.
    pub fn add_rectangle(&mut self, frame: Rect, fill: Rgb) -> &mut Shape {
        let shape = Shape::rectangle(self.next_shape_id(), frame, fill);
        self.add_shape(shape)
    }

    /// The title placeholder, if the layout provided one.
    pub fn title_shape_mut(&mut self) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.is_title())
    }

    /// A placeholder by its index.
    pub fn placeholder_mut(&mut self, idx: u32) -> Option<&mut Shape> {
        self.shapes
            .iter_mut()
            .find(|s| matches!(s.kind, ShapeKind::Placeholder { idx: i, .. } if i == idx))
    }

    /// Detach a shape from the shape tree.
    pub fn remove_shape(&mut self, id: u32) -> Option<Shape> {
        let position = self.shapes.iter().position(|s| s.id == id)?;
        Some(self.shapes.remove(position))
    }

    /// Texts of all shapes that carry text, in z-order.
    pub fn texts(&self) -> Vec<String> {
        self.shapes
            .iter()
            .filter(|s| s.has_text_frame())
            .map(|s| s.text())
            .collect()
    }
}

/// Placeholder types (`p:ph/@type`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceholderKind {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    /// Generic content placeholder; the type when `@type` is absent.
    Object,
    Other(String),
}

impl PlaceholderKind {
    /// Parse the `type` attribute of a `p:ph` element.
    pub fn from_ooxml(value: Option<&str>) -> Self {
        match value {
            None | Some("obj") => Self::Object,
            Some("title") => Self::Title,
            Some("ctrTitle") => Self::CenterTitle,
            Some("subTitle") => Self::Subtitle,
            Some("body") => Self::Body,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// The `type` attribute value, or `None` for the implicit object type.
    pub fn as_ooxml(&self) -> Option<&str> {
        match self {
            Self::Title => Some("title"),
            Self::CenterTitle => Some("ctrTitle"),
            Self::Subtitle => Some("subTitle"),
            Self::Body => Some("body"),
            Self::Object => None,
            Self::Other(other) => Some(other.as_str()),
        }
    }

    /// Whether this is one of the title types.
    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title | Self::CenterTitle)
    }

    /// Title types match each other; every other type matches the body family.
    fn same_family(&self, other: &PlaceholderKind) -> bool {
        self.is_title() == other.is_title()
    }

    fn display_name(&self) -> &str {
        match self {
            Self::Title | Self::CenterTitle => "Title",
            Self::Subtitle => "Subtitle",
            Self::Body => "Text Placeholder",
            Self::Object => "Content Placeholder",
            Self::Other(_) => "Placeholder",
        }
    }
}

/// What sort of element a shape is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    TextBox,
    Placeholder { kind: PlaceholderKind, idx: u32 },
    /// A preset-geometry shape such as `rect`.
    AutoShape(String),
    Picture,
    Group,
    Connector,
    GraphicFrame,
    Other(String),
}

/// Markup a loaded shape was parsed from.
#[derive(Debug, Clone)]
pub struct ShapeMarkup {
    pub xml: String,
    /// Range inside `xml` holding the paragraphs of the text body.
    pub paragraphs: Option<Range<usize>>,
}

/// A positioned element on a slide.
#[derive(Debug, Clone, Serialize)]
pub struct Shape {
    pub id: u32,
    pub name: String,
    pub kind: ShapeKind,

    /// Bounding box; inherited from the layout for placeholders that omit it.
    pub frame: Option<Rect>,

    /// Solid fill colour.
    pub fill: Option<Rgb>,

    text: Option<TextFrame>,

    #[serde(skip)]
    text_modified: bool,

    #[serde(skip)]
    markup: Option<ShapeMarkup>,
}

impl Shape {
    /// A new text box with an empty text frame.
    pub fn text_box(id: u32, frame: Rect) -> Self {
        Self {
            id,
            name: format!("TextBox {}", id - 1),
            kind: ShapeKind::TextBox,
            frame: Some(frame),
            fill: None,
            text: Some(TextFrame::default()),
            text_modified: false,
            markup: None,
        }
    }

    /// A new filled rectangle with an empty text frame.
    pub fn rectangle(id: u32, frame: Rect, fill: Rgb) -> Self {
        Self {
            id,
            name: format!("Rectangle {}", id - 1),
            kind: ShapeKind::AutoShape("rect".to_string()),
            frame: Some(frame),
            fill: Some(fill),
            text: Some(TextFrame::default()),
            text_modified: false,
            markup: None,
        }
    }

    /// A new placeholder without a frame; callers set the frame when known.
    pub fn placeholder(id: u32, kind: PlaceholderKind, idx: u32) -> Self {
        Self {
            id,
            name: format!("Placeholder {}", id - 1),
            kind: ShapeKind::Placeholder { kind, idx },
            frame: None,
            fill: None,
            text: Some(TextFrame::default()),
            text_modified: false,
            markup: None,
        }
    }

    /// A shape read from a file, together with its source markup.
    pub fn loaded(
        id: u32,
        name: String,
        kind: ShapeKind,
        frame: Option<Rect>,
        fill: Option<Rgb>,
        text: Option<TextFrame>,
        markup: ShapeMarkup,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            frame,
            fill,
            text,
            text_modified: false,
            markup: Some(markup),
        }
    }

    /// Whether this shape is a title placeholder.
    pub fn is_title(&self) -> bool {
        matches!(&self.kind, ShapeKind::Placeholder { kind, .. } if kind.is_title())
    }

    /// Whether the shape can hold text.
    pub fn has_text_frame(&self) -> bool {
        self.text.is_some()
    }

    /// The text frame, if any.
    pub fn text_frame(&self) -> Option<&TextFrame> {
        self.text.as_ref()
    }

    /// Mutable access to the text frame; marks the text as modified.
    pub fn text_frame_mut(&mut self) -> Option<&mut TextFrame> {
        if self.text.is_some() {
            self.text_modified = true;
        }
        self.text.as_mut()
    }

    /// Concatenated text: runs in order, paragraphs joined by `\n`.
    pub fn text(&self) -> String {
        self.text.as_ref().map(|t| t.text()).unwrap_or_default()
    }

    /// Whether the text changed since the shape was created or loaded.
    pub fn is_text_modified(&self) -> bool {
        self.text_modified
    }

    /// Markup this shape was loaded from.
    pub fn markup(&self) -> Option<&ShapeMarkup> {
        self.markup.as_ref()
    }

    /// Replace all text with one single-run paragraph per line.
    ///
    /// Returns `false` (and changes nothing) when the shape has no text frame.
    pub fn replace_text<S: AsRef<str>>(
        &mut self,
        lines: &[S],
        style: &TextStyle,
        space_after: Option<f64>,
    ) -> bool {
        match self.text_frame_mut() {
            Some(frame) => {
                frame.clear();
                for line in lines {
                    frame.add_paragraph(
                        Paragraph::styled(line.as_ref(), style).with_space_after(space_after),
                    );
                }
                true
            }
            None => false,
        }
    }
}

/// Vertical anchoring of text in its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    Top,
    Middle,
    Bottom,
}

impl Anchor {
    /// Value of `a:bodyPr/@anchor`.
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Top => "t",
            Self::Middle => "ctr",
            Self::Bottom => "b",
        }
    }
}

/// The text content of a shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
    pub word_wrap: bool,
    pub anchor: Option<Anchor>,
    pub inset_left: Option<Emu>,
}

impl Default for TextFrame {
    fn default() -> Self {
        Self {
            paragraphs: Vec::new(),
            word_wrap: true,
            anchor: None,
            inset_left: None,
        }
    }
}

impl TextFrame {
    /// Remove every paragraph.
    pub fn clear(&mut self) {
        self.paragraphs.clear();
    }

    /// Append a paragraph and return it.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) -> &mut Paragraph {
        self.paragraphs.push(paragraph);
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    /// Paragraph texts joined by `\n`.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Value of `a:pPr/@algn`.
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
        }
    }

    /// Parse `a:pPr/@algn`.
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "l" => Some(Self::Left),
            "ctr" => Some(Self::Center),
            "r" => Some(Self::Right),
            _ => None,
        }
    }
}

/// A paragraph of runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    /// Indent level, 0 for top-level items.
    pub level: u8,
    pub alignment: Option<Alignment>,
    /// Space before, in points.
    pub space_before: Option<f64>,
    /// Space after, in points.
    pub space_after: Option<f64>,
}

impl Paragraph {
    /// A paragraph holding one run with complete formatting.
    pub fn styled(text: &str, style: &TextStyle) -> Self {
        Self {
            runs: vec![Run::styled(text, style)],
            ..Default::default()
        }
    }

    /// Builder method: set the indent level.
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    /// Builder method: set the space after, in points.
    pub fn with_space_after(mut self, points: Option<f64>) -> Self {
        self.space_after = points;
        self
    }

    /// Builder method: set the alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Concatenated run text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// The smallest unit of styled text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Run {
    pub text: String,
    pub props: RunProps,
}

impl Run {
    /// A run with complete formatting.
    pub fn styled(text: &str, style: &TextStyle) -> Self {
        Self {
            text: text.to_string(),
            props: RunProps::from(style),
        }
    }
}

/// Character formatting as stored on a run; absent fields inherit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunProps {
    /// Size in points.
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub color: Option<Rgb>,
    /// Face for Latin and number glyphs (`a:latin`).
    pub latin: Option<String>,
    /// Face for CJK glyphs (`a:ea`).
    pub east_asian: Option<String>,
}

impl From<&TextStyle> for RunProps {
    fn from(style: &TextStyle) -> Self {
        Self {
            size: Some(style.size),
            bold: Some(style.bold),
            color: Some(style.color),
            latin: Some(style.typefaces.latin.clone()),
            east_asian: Some(style.typefaces.east_asian.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{StyleConfig, TextRole};

    fn document() -> Document {
        Document::new(Emu::inches(13.333), Emu::inches(7.5))
    }

    #[test]
    fn test_standard_layout_catalogue() {
        let doc = document();
        assert_eq!(doc.layouts.len(), 7);
        assert_eq!(doc.layouts[LAYOUT_TITLE_SLIDE].name, "Title Slide");
        assert_eq!(doc.layouts[LAYOUT_TITLE_ONLY].name, "Title Only");
        assert!(doc.layouts[LAYOUT_BLANK].placeholders.is_empty());
    }

    #[test]
    fn test_add_slide_creates_placeholders() {
        let mut doc = document();
        let slide = doc.add_slide(LAYOUT_TITLE_AND_CONTENT).unwrap();
        assert_eq!(slide.shapes.len(), 2);
        assert!(slide.shapes[0].is_title());
        assert!(slide.shapes[0].frame.is_some());
        assert_eq!(slide.shapes[0].id, 2);
        assert_eq!(slide.shapes[1].id, 3);
    }

    #[test]
    fn test_add_slide_unknown_layout() {
        let mut doc = document();
        let err = doc.add_slide(11).unwrap_err();
        assert!(matches!(err, Error::LayoutNotFound { index: 11, available: 7 }));
        assert!(doc.slides.is_empty());
    }

    #[test]
    fn test_text_concatenation() {
        let style = StyleConfig::default().text_style(TextRole::Bullet);
        let mut frame = TextFrame::default();
        let mut paragraph = Paragraph::styled("Hello ", &style);
        paragraph.runs.push(Run::styled("world", &style));
        frame.add_paragraph(paragraph);
        frame.add_paragraph(Paragraph::styled("second", &style));
        assert_eq!(frame.text(), "Hello world\nsecond");
    }

    #[test]
    fn test_replace_text_marks_modified() {
        let style = StyleConfig::default().text_style(TextRole::Bullet);
        let mut shape = Shape::text_box(2, Rect::inches(0.0, 0.0, 1.0, 1.0));
        assert!(!shape.is_text_modified());
        assert!(shape.replace_text(&["a", "b"], &style, Some(10.0)));
        assert!(shape.is_text_modified());
        assert_eq!(shape.text(), "a\nb");
        let frame = shape.text_frame().unwrap();
        assert_eq!(frame.paragraphs[1].space_after, Some(10.0));
        assert_eq!(
            frame.paragraphs[0].runs[0].props.east_asian.as_deref(),
            Some("HarmonyOS Sans SC")
        );
    }

    #[test]
    fn test_slide_title_and_removal() {
        let mut doc = document();
        let style = StyleConfig::default().text_style(TextRole::Title);
        let slide = doc.add_slide(LAYOUT_TITLE_ONLY).unwrap();
        slide.title_shape_mut().unwrap().replace_text(&["Agenda"], &style, None);
        let id = slide.add_text_box(Rect::inches(1.0, 2.0, 3.0, 1.0)).id;
        assert_eq!(slide.title().as_deref(), Some("Agenda"));
        assert_eq!(slide.shapes.len(), 2);

        let removed = slide.remove_shape(id).unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(slide.shapes.len(), 1);
        assert!(slide.remove_shape(id).is_none());
    }

    #[test]
    fn test_placeholder_kind_ooxml() {
        assert_eq!(PlaceholderKind::from_ooxml(None), PlaceholderKind::Object);
        assert_eq!(PlaceholderKind::from_ooxml(Some("ctrTitle")), PlaceholderKind::CenterTitle);
        assert_eq!(PlaceholderKind::Subtitle.as_ooxml(), Some("subTitle"));
        assert!(PlaceholderKind::CenterTitle.is_title());
    }

    #[test]
    fn test_inherited_frame() {
        let layouts = Layout::standard_set(Emu::inches(13.333), Emu::inches(7.5));
        let content = &layouts[LAYOUT_TITLE_AND_CONTENT];
        let title = content.inherited_frame(&PlaceholderKind::Title, 0).unwrap();
        let body = content.inherited_frame(&PlaceholderKind::Object, 1).unwrap();
        assert!(title.top < body.top);
        // A body placeholder without a matching idx falls back to the body family.
        assert_eq!(content.inherited_frame(&PlaceholderKind::Body, 7), Some(body));
    }

    #[test]
    fn test_file_format() {
        assert_eq!(FileFormat::from_extension("PPTX"), Some(FileFormat::Presentation));
        assert_eq!(FileFormat::from_extension("docx"), Some(FileFormat::WordProcessing));
        assert_eq!(FileFormat::from_extension("ppt"), None);
        assert!(FileFormat::is_zip_container(b"PK\x03\x04rest"));
    }
}
