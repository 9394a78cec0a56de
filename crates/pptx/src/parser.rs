//! PPTX reader: builds a document tree from a PresentationML package.
//!
//! Every part is kept in memory so the writer can copy untouched parts back
//! verbatim. Slide shapes record their source markup and the byte range of
//! their paragraph list; that is what lets a save re-render only the text
//! that changed.

use crate::package::{part_text, read_package};
use crate::rels::{parse_relationships, rels_part_for, resolve_target, Relationship};
use deck_core::types::{
    Alignment, Anchor, Document, Layout, LayoutPlaceholder, Paragraph, PlaceholderKind, Run,
    Shape, ShapeKind, ShapeMarkup, Slide, SlideMarkup, SourcePackage, TextFrame,
};
use deck_core::{Emu, Error, Rect, Result, Rgb};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::io::{Read, Seek};
use std::ops::Range;
use std::path::Path;

const DEFAULT_MAIN_PART: &str = "ppt/presentation.xml";

/// Reader for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Open and parse a file.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let file = std::fs::File::open(path.as_ref())?;
        self.parse(std::io::BufReader::new(file))
    }

    /// Parse a PPTX container from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Document> {
        let package = read_package(reader)?;
        self.parse_package(package)
    }

    /// Build a document from an already loaded package.
    pub fn parse_package(&self, package: SourcePackage) -> Result<Document> {
        let main = self.main_part(&package)?;
        let presentation = parse_presentation(&part_text(&package, &main)?)?;
        let rels = relationships(&package, &main)?;
        let slide_parts = slide_order(&main, &presentation.slide_rel_ids, &rels);

        let (layout_parts, layouts) = self.load_layouts(&package)?;

        let mut slides = Vec::with_capacity(slide_parts.len());
        for part in &slide_parts {
            slides.push(self.parse_slide(&package, part, &layout_parts, &layouts)?);
        }
        log::debug!(
            "Parsed {} slides and {} layouts from '{}'",
            slides.len(),
            layouts.len(),
            main
        );

        let mut doc = Document::from_source(presentation.width, presentation.height, layouts, package);
        doc.slides = slides;
        Ok(doc)
    }

    /// The presentation part named by the package relationships.
    fn main_part(&self, package: &SourcePackage) -> Result<String> {
        let main = relationships(package, "")?
            .into_iter()
            .find(|rel| rel.is("officeDocument"))
            .map(|rel| resolve_target("", &rel.target))
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());

        if package.part(&main).is_none() {
            return Err(Error::UnsupportedFormat(format!(
                "No presentation part '{}' in package",
                main
            )));
        }
        Ok(main)
    }

    /// Every slide layout in the package, ordered by part number, with frames
    /// inherited from the master filled in.
    fn load_layouts(&self, package: &SourcePackage) -> Result<(Vec<String>, Vec<Layout>)> {
        let mut parts: Vec<String> = package
            .parts
            .keys()
            .filter(|name| name.starts_with("ppt/slideLayouts/") && name.ends_with(".xml"))
            .filter(|name| !name.contains("/_rels/"))
            .cloned()
            .collect();
        parts.sort_by_key(|name| extract_slide_number(name));

        let mut masters: BTreeMap<String, Layout> = BTreeMap::new();
        let mut layouts = Vec::with_capacity(parts.len());

        for part in &parts {
            let master_part = relationships(package, part)?
                .into_iter()
                .find(|rel| rel.is("slideMaster"))
                .map(|rel| resolve_target(part, &rel.target));

            let master = match master_part {
                Some(name) if package.part(&name).is_some() => {
                    if !masters.contains_key(&name) {
                        let master = parse_layout(&part_text(package, &name)?, None)?;
                        masters.insert(name.clone(), master);
                    }
                    masters.get(&name)
                }
                _ => None,
            };

            layouts.push(parse_layout(&part_text(package, part)?, master)?);
        }

        Ok((parts, layouts))
    }

    /// Parse one slide part.
    fn parse_slide(
        &self,
        package: &SourcePackage,
        part: &str,
        layout_parts: &[String],
        layouts: &[Layout],
    ) -> Result<Slide> {
        let xml = part_text(package, part)?;

        let layout = relationships(package, part)?
            .into_iter()
            .find(|rel| rel.is("slideLayout"))
            .map(|rel| resolve_target(part, &rel.target))
            .and_then(|target| layout_parts.iter().position(|p| *p == target))
            .unwrap_or(0);

        let tree = parse_shape_tree(&xml)
            .map_err(|e| Error::PptxParseError(format!("{}: {}", part, e)))?;

        let mut shapes = Vec::with_capacity(tree.shapes.len());
        for range in &tree.shapes {
            let mut shape = parse_shape(&xml[range.clone()])?;
            if shape.frame.is_none() {
                if let (ShapeKind::Placeholder { kind, idx }, Some(definition)) =
                    (&shape.kind, layouts.get(layout))
                {
                    shape.frame = definition.inherited_frame(kind, *idx);
                }
            }
            shapes.push(shape);
        }
        log::debug!("Slide '{}': {} shapes", part, shapes.len());

        let mut slide = Slide::new(layout);
        slide.shapes = shapes;
        slide.part_name = Some(part.to_string());
        slide.markup = Some(SlideMarkup {
            xml,
            shapes: tree.range,
        });
        Ok(slide)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Relationships of a part; a part without a relationships part has none.
fn relationships(package: &SourcePackage, part: &str) -> Result<Vec<Relationship>> {
    let rels_part = rels_part_for(part);
    match package.part(&rels_part) {
        Some(_) => parse_relationships(&part_text(package, &rels_part)?),
        None => Ok(Vec::new()),
    }
}

/// What the reader needs from `presentation.xml`.
struct PresentationInfo {
    width: Emu,
    height: Emu,
    slide_rel_ids: Vec<String>,
}

fn parse_presentation(xml: &str) -> Result<PresentationInfo> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut info = PresentationInfo {
        width: Emu(9_144_000),
        height: Emu(6_858_000),
        slide_rel_ids: Vec::new(),
    };

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                match local_name(e.name().as_ref()) {
                    b"sldSz" => {
                        if let Some(cx) = attr_i64(e, b"cx") {
                            info.width = Emu(cx);
                        }
                        if let Some(cy) = attr_i64(e, b"cy") {
                            info.height = Emu(cy);
                        }
                    }
                    b"sldId" => {
                        let rel_id = e
                            .attributes()
                            .flatten()
                            .find(|a| {
                                let key = a.key.as_ref();
                                key.contains(&b':') && local_name(key) == b"id"
                            })
                            .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()));
                        if let Some(rel_id) = rel_id {
                            info.slide_rel_ids.push(rel_id);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation part: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(info)
}

/// Slide part names in presentation order.
///
/// Follows `sldIdLst`; packages without one fall back to numbering in the
/// relationship ids or targets.
fn slide_order(main: &str, slide_rel_ids: &[String], rels: &[Relationship]) -> Vec<String> {
    if !slide_rel_ids.is_empty() {
        return slide_rel_ids
            .iter()
            .filter_map(|id| rels.iter().find(|rel| rel.id == *id))
            .map(|rel| resolve_target(main, &rel.target))
            .collect();
    }

    let mut slides: Vec<(String, Option<usize>)> = rels
        .iter()
        .filter(|rel| rel.is("slide") && !rel.external)
        .map(|rel| {
            let order = extract_slide_number(&rel.id).or_else(|| extract_slide_number(&rel.target));
            (resolve_target(main, &rel.target), order)
        })
        .collect();

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    slides.into_iter().map(|(path, _)| path).collect()
}

/// Parse a layout or master part into its placeholders. Placeholders without
/// their own frame take the master's; those still unresolved are dropped.
fn parse_layout(xml: &str, master: Option<&Layout>) -> Result<Layout> {
    let tree = parse_shape_tree(xml)?;
    let mut placeholders = Vec::new();

    for range in &tree.shapes {
        let shape = parse_shape(&xml[range.clone()])?;
        if let ShapeKind::Placeholder { kind, idx } = shape.kind {
            let frame = shape
                .frame
                .or_else(|| master.and_then(|m| m.inherited_frame(&kind, idx)));
            if let Some(frame) = frame {
                placeholders.push(LayoutPlaceholder { kind, idx, frame });
            }
        }
    }

    Ok(Layout {
        name: tree.name.unwrap_or_default(),
        placeholders,
    })
}

/// Byte ranges of a part's shape tree and of each top-level shape in it.
#[derive(Debug)]
pub(crate) struct ShapeTree {
    /// From the end of the group properties up to `p:extLst` or `</p:spTree>`.
    pub range: Range<usize>,
    pub shapes: Vec<Range<usize>>,
    /// `p:cSld/@name`.
    pub name: Option<String>,
}

pub(crate) fn parse_shape_tree(xml: &str) -> Result<ShapeTree> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut tree_depth: Option<usize> = None;
    let mut start: Option<usize> = None;
    let mut end: Option<usize> = None;
    let mut open_shape: Option<usize> = None;
    let mut shapes = Vec::new();
    let mut name = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("Error parsing shape tree: {}", e)))?;
        let pos = reader.buffer_position();

        match event {
            Event::Start(ref e) => {
                let local = local_name(e.name().as_ref()).to_vec();
                if local == b"cSld" {
                    name = attr_string(e, b"name");
                }
                if tree_depth == Some(stack.len()) && end.is_none() {
                    match local.as_slice() {
                        b"nvGrpSpPr" | b"grpSpPr" => {}
                        b"extLst" => end = Some(tag_start(xml, pos)),
                        _ => open_shape = Some(tag_start(xml, pos)),
                    }
                }
                stack.push(local);
                if tree_depth.is_none() && stack.last().map(|n| n.as_slice()) == Some(&b"spTree"[..]) {
                    tree_depth = Some(stack.len());
                    start = Some(pos);
                }
            }
            Event::Empty(ref e) => {
                if tree_depth == Some(stack.len()) && end.is_none() {
                    match local_name(e.name().as_ref()) {
                        b"nvGrpSpPr" | b"grpSpPr" => start = Some(pos),
                        b"extLst" => end = Some(tag_start(xml, pos)),
                        _ => shapes.push(tag_start(xml, pos)..pos),
                    }
                }
            }
            Event::End(_) => {
                let closed = stack.pop().unwrap_or_default();
                if let Some(depth) = tree_depth {
                    if stack.len() == depth {
                        match closed.as_slice() {
                            b"nvGrpSpPr" | b"grpSpPr" => start = Some(pos),
                            _ => {
                                if let Some(shape_start) = open_shape.take() {
                                    shapes.push(shape_start..pos);
                                }
                            }
                        }
                    } else if stack.len() + 1 == depth {
                        if end.is_none() {
                            end = Some(tag_start(xml, pos));
                        }
                        break;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (start, end) {
        (Some(start), Some(end)) => Ok(ShapeTree {
            range: start..end,
            shapes,
            name,
        }),
        _ => Err(Error::PptxParseError("No shape tree found".to_string())),
    }
}

/// Collected state while reading one shape element.
#[derive(Default)]
struct ShapeBuilder {
    root: Vec<u8>,
    id: u32,
    name: String,
    text_box: bool,
    placeholder: Option<(PlaceholderKind, u32)>,
    geometry: Option<String>,
    offset: Option<(i64, i64)>,
    extent: Option<(i64, i64)>,
    fill: Option<Rgb>,
    text: Option<TextFrame>,
    paragraphs: Option<Range<usize>>,
    paragraph: Option<Paragraph>,
    run: Option<Run>,
}

impl ShapeBuilder {
    fn open(&mut self, e: &BytesStart, stack: &[Vec<u8>], xml: &str, pos: usize) {
        let name = e.name();
        let local = local_name(name.as_ref());

        if stack.is_empty() {
            self.root = local.to_vec();
            return;
        }

        let path: Vec<&[u8]> = stack[1..].iter().map(|n| n.as_slice()).collect();
        match (path.as_slice(), local) {
            ([_], b"cNvPr") => {
                self.id = attr_i64(e, b"id").unwrap_or(0) as u32;
                self.name = attr_string(e, b"name").unwrap_or_default();
            }
            ([_], b"cNvSpPr") => self.text_box = attr_string(e, b"txBox").as_deref() == Some("1"),
            ([_, b"nvPr"], b"ph") => {
                let kind = PlaceholderKind::from_ooxml(attr_string(e, b"type").as_deref());
                let idx = attr_i64(e, b"idx").unwrap_or(0) as u32;
                self.placeholder = Some((kind, idx));
            }
            ([b"spPr" | b"grpSpPr", b"xfrm"], b"off") | ([b"xfrm"], b"off") => {
                self.offset = attr_i64(e, b"x").zip(attr_i64(e, b"y"));
            }
            ([b"spPr" | b"grpSpPr", b"xfrm"], b"ext") | ([b"xfrm"], b"ext") => {
                self.extent = attr_i64(e, b"cx").zip(attr_i64(e, b"cy"));
            }
            ([b"spPr"], b"prstGeom") => self.geometry = attr_string(e, b"prst"),
            ([b"spPr", b"solidFill"], b"srgbClr") => {
                self.fill = attr_string(e, b"val").and_then(|v| v.parse().ok());
            }
            ([], b"txBody") => self.text = Some(TextFrame::default()),
            ([b"txBody"], b"bodyPr") => {
                if let Some(frame) = self.text.as_mut() {
                    frame.word_wrap = attr_string(e, b"wrap").as_deref() != Some("none");
                    frame.anchor = match attr_string(e, b"anchor").as_deref() {
                        Some("t") => Some(Anchor::Top),
                        Some("ctr") => Some(Anchor::Middle),
                        Some("b") => Some(Anchor::Bottom),
                        _ => None,
                    };
                    frame.inset_left = attr_i64(e, b"lIns").map(Emu);
                }
            }
            ([b"txBody"], b"p") => {
                if self.paragraphs.is_none() {
                    let start = tag_start(xml, pos);
                    self.paragraphs = Some(start..start);
                }
                self.paragraph = Some(Paragraph::default());
            }
            ([b"txBody", b"p"], b"pPr") => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.level = attr_i64(e, b"lvl").unwrap_or(0) as u8;
                    paragraph.alignment =
                        attr_string(e, b"algn").and_then(|v| Alignment::from_ooxml(&v));
                }
            }
            ([b"txBody", b"p", b"pPr", spacing], b"spcPts") => {
                let points = attr_i64(e, b"val").map(|v| v as f64 / 100.0);
                if let Some(paragraph) = self.paragraph.as_mut() {
                    match *spacing {
                        b"spcBef" => paragraph.space_before = points,
                        b"spcAft" => paragraph.space_after = points,
                        _ => {}
                    }
                }
            }
            ([b"txBody", b"p"], b"r" | b"fld") => self.run = Some(Run::default()),
            ([b"txBody", b"p"], b"br") => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.runs.push(Run {
                        text: "\n".to_string(),
                        ..Default::default()
                    });
                }
            }
            ([b"txBody", b"p", b"r" | b"fld"], b"rPr") => {
                if let Some(run) = self.run.as_mut() {
                    run.props.size = attr_i64(e, b"sz").map(|v| v as f64 / 100.0);
                    run.props.bold = attr_string(e, b"b").map(|v| v == "1" || v == "true");
                }
            }
            ([b"txBody", b"p", b"r" | b"fld", b"rPr", b"solidFill"], b"srgbClr") => {
                if let Some(run) = self.run.as_mut() {
                    run.props.color = attr_string(e, b"val").and_then(|v| v.parse().ok());
                }
            }
            ([b"txBody", b"p", b"r" | b"fld", b"rPr"], b"latin") => {
                if let Some(run) = self.run.as_mut() {
                    run.props.latin = attr_string(e, b"typeface");
                }
            }
            ([b"txBody", b"p", b"r" | b"fld", b"rPr"], b"ea") => {
                if let Some(run) = self.run.as_mut() {
                    run.props.east_asian = attr_string(e, b"typeface");
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, local: &[u8], stack: &[Vec<u8>], xml: &str, pos: usize) {
        let path: Vec<&[u8]> = stack.iter().skip(1).map(|n| n.as_slice()).collect();
        match (path.as_slice(), local) {
            ([b"txBody", b"p"], b"r" | b"fld") => {
                if let (Some(run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    paragraph.runs.push(run);
                }
            }
            ([b"txBody"], b"p") => {
                if let (Some(paragraph), Some(frame)) = (self.paragraph.take(), self.text.as_mut()) {
                    frame.paragraphs.push(paragraph);
                }
                if let Some(range) = self.paragraphs.as_mut() {
                    range.end = pos;
                }
            }
            ([], b"txBody") => {
                if self.paragraphs.is_none() {
                    let end = tag_start(xml, pos);
                    self.paragraphs = Some(end..end);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, stack: &[Vec<u8>], text: &str) {
        let in_run_text = stack.len() == 5
            && stack[1] == b"txBody"
            && stack[2] == b"p"
            && stack[4] == b"t";
        if in_run_text {
            if let Some(run) = self.run.as_mut() {
                run.text.push_str(text);
            }
        }
    }

    fn finish(self, xml: &str) -> Shape {
        let kind = match self.root.as_slice() {
            b"sp" => match self.placeholder {
                Some((kind, idx)) => ShapeKind::Placeholder { kind, idx },
                None if self.text_box => ShapeKind::TextBox,
                None => ShapeKind::AutoShape(self.geometry.unwrap_or_else(|| "rect".to_string())),
            },
            b"pic" => ShapeKind::Picture,
            b"grpSp" => ShapeKind::Group,
            b"cxnSp" => ShapeKind::Connector,
            b"graphicFrame" => ShapeKind::GraphicFrame,
            other => ShapeKind::Other(String::from_utf8_lossy(other).to_string()),
        };

        let frame = self.offset.map(|(x, y)| {
            let (cx, cy) = self.extent.unwrap_or((0, 0));
            Rect::new(Emu(x), Emu(y), Emu(cx), Emu(cy))
        });

        let paragraphs = if self.text.is_some() { self.paragraphs } else { None };

        Shape::loaded(
            self.id,
            self.name,
            kind,
            frame,
            self.fill,
            self.text,
            ShapeMarkup {
                xml: xml.to_string(),
                paragraphs,
            },
        )
    }
}

/// Parse one shape element (`p:sp`, `p:pic`, `p:grpSp`, ...).
pub(crate) fn parse_shape(xml: &str) -> Result<Shape> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut builder = ShapeBuilder::default();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("Error parsing shape: {}", e)))?;
        let pos = reader.buffer_position();

        match event {
            Event::Start(ref e) => {
                builder.open(e, &stack, xml, pos);
                stack.push(local_name(e.name().as_ref()).to_vec());
            }
            Event::Empty(ref e) => {
                builder.open(e, &stack, xml, pos);
                let name = e.name();
                let local = local_name(name.as_ref());
                if stack.is_empty() {
                    break;
                }
                builder.close(local, &stack, xml, pos);
            }
            Event::Text(ref t) => {
                let text = t
                    .unescape()
                    .map_err(|e| Error::XmlError(format!("Bad text in shape: {}", e)))?;
                builder.text(&stack, &text);
            }
            Event::End(ref e) => {
                stack.pop();
                builder.close(local_name(e.name().as_ref()), &stack, xml, pos);
                if stack.is_empty() {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(builder.finish(xml))
}

/// Offset of the `<` opening the tag that ends just before `end`.
fn tag_start(xml: &str, end: usize) -> usize {
    xml[..end].rfind('<').unwrap_or(0)
}

fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()))
}

fn attr_i64(e: &BytesStart, key: &[u8]) -> Option<i64> {
    attr_string(e, key).and_then(|v| v.trim().parse().ok())
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a number from a string like "rId2" or "slide3.xml".
pub(crate) fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
