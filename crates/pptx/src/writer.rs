//! PPTX writer.
//!
//! Fresh documents get a complete minimal package. Documents loaded from a
//! file are written back part by part: everything except slide parts is
//! copied verbatim, and inside slides only shapes whose text changed are
//! re-rendered.

use crate::package::{PackageWriter, CONTENT_TYPES_PART};
use crate::template;
use deck_core::types::{Document, Paragraph, Run, RunProps, Shape, ShapeKind, Slide, TextFrame};
use deck_core::{Error, Rect, Result, Typefaces};
use quick_xml::escape::escape;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{Seek, Write};
use std::path::Path;

/// Serializes documents as PPTX containers.
#[derive(Debug, Clone, Default)]
pub struct PptxWriter {
    typefaces: Typefaces,
}

impl PptxWriter {
    /// Create a writer whose theme uses the default typefaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: typefaces for the theme font scheme of fresh packages.
    pub fn with_typefaces(mut self, typefaces: Typefaces) -> Self {
        self.typefaces = typefaces;
        self
    }

    /// Write to a file, replacing it if present.
    pub fn save<P: AsRef<Path>>(&self, doc: &Document, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut out = self.write(doc, std::io::BufWriter::new(file))?;
        out.flush()?;
        Ok(())
    }

    /// Write the document into `writer`.
    pub fn write<W: Write + Seek>(&self, doc: &Document, writer: W) -> Result<W> {
        let parts = match doc.source() {
            Some(_) => self.loaded_parts(doc)?,
            None => self.fresh_parts(doc)?,
        };

        let mut package = PackageWriter::new(writer);
        for (name, content) in &parts {
            package.add(name, content)?;
        }
        package.finish()
    }

    /// Parts of a package that was read from a file, with slides re-rendered.
    fn loaded_parts(&self, doc: &Document) -> Result<Vec<(String, Vec<u8>)>> {
        let source = doc
            .source()
            .ok_or_else(|| Error::Unsupported("Document has no source package".to_string()))?;

        let mut rendered: BTreeMap<&str, String> = BTreeMap::new();
        for slide in &doc.slides {
            let part = slide.part_name.as_deref().ok_or_else(|| {
                Error::Unsupported("Adding slides to a loaded presentation".to_string())
            })?;
            rendered.insert(part, render_loaded_slide(slide)?);
        }

        let mut parts = Vec::with_capacity(source.parts.len());
        if let Some(content_types) = source.part(CONTENT_TYPES_PART) {
            parts.push((CONTENT_TYPES_PART.to_string(), content_types.to_vec()));
        }
        for (name, content) in &source.parts {
            if name == CONTENT_TYPES_PART {
                continue;
            }
            let content = match rendered.get(name.as_str()) {
                Some(xml) => xml.clone().into_bytes(),
                None => content.clone(),
            };
            parts.push((name.clone(), content));
        }

        log::debug!("Re-rendered {} slide parts", rendered.len());
        Ok(parts)
    }

    /// Every part of a new package.
    fn fresh_parts(&self, doc: &Document) -> Result<Vec<(String, Vec<u8>)>> {
        let slide_count = doc.slides.len();
        let layout_count = doc.layouts.len();
        let mut parts: Vec<(String, String)> = Vec::new();

        parts.push((
            CONTENT_TYPES_PART.to_string(),
            template::content_types(slide_count, layout_count),
        ));
        parts.push(("_rels/.rels".to_string(), template::package_rels()));

        let title = doc
            .slides
            .iter()
            .find_map(|s| s.title())
            .unwrap_or_else(|| "Presentation".to_string());
        parts.push(("docProps/core.xml".to_string(), template::core_properties(&title)));
        parts.push(("docProps/app.xml".to_string(), template::app_properties(slide_count)));

        parts.push(("ppt/presentation.xml".to_string(), template::presentation(doc)));
        parts.push((
            "ppt/_rels/presentation.xml.rels".to_string(),
            template::presentation_rels(slide_count),
        ));
        parts.push(("ppt/presProps.xml".to_string(), template::pres_props()));
        parts.push(("ppt/tableStyles.xml".to_string(), template::table_styles()));
        parts.push(("ppt/theme/theme1.xml".to_string(), template::theme(&self.typefaces)));

        parts.push((
            "ppt/slideMasters/slideMaster1.xml".to_string(),
            template::slide_master(doc)?,
        ));
        parts.push((
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            template::slide_master_rels(layout_count),
        ));

        for (index, layout) in doc.layouts.iter().enumerate() {
            parts.push((
                format!("ppt/slideLayouts/slideLayout{}.xml", index + 1),
                template::slide_layout(layout)?,
            ));
            parts.push((
                format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", index + 1),
                template::slide_layout_rels(),
            ));
        }

        for (index, slide) in doc.slides.iter().enumerate() {
            if slide.layout >= layout_count {
                return Err(Error::LayoutNotFound {
                    index: slide.layout,
                    available: layout_count,
                });
            }
            parts.push((
                format!("ppt/slides/slide{}.xml", index + 1),
                render_fresh_slide(slide)?,
            ));
            parts.push((
                format!("ppt/slides/_rels/slide{}.xml.rels", index + 1),
                template::slide_rels(slide.layout),
            ));
        }

        log::debug!("Rendered {} parts for a new package", parts.len());
        Ok(parts
            .into_iter()
            .map(|(name, xml)| (name, xml.into_bytes()))
            .collect())
    }
}

/// A slide of a new package.
fn render_fresh_slide(slide: &Slide) -> Result<String> {
    let mut shapes = String::new();
    for shape in &slide.shapes {
        shapes.push_str(&render_shape(shape)?);
    }
    Ok(template::slide(&shapes))
}

/// A loaded slide: source markup around the current shape list.
fn render_loaded_slide(slide: &Slide) -> Result<String> {
    let markup = slide.markup.as_ref().ok_or_else(|| {
        Error::Unsupported("Slide of a loaded presentation has no source markup".to_string())
    })?;

    let mut xml = String::with_capacity(markup.xml.len());
    xml.push_str(&markup.xml[..markup.shapes.start]);
    for shape in &slide.shapes {
        xml.push_str(&render_loaded_shape(shape)?);
    }
    xml.push_str(&markup.xml[markup.shapes.end..]);
    Ok(xml)
}

/// Source markup for untouched shapes; modified shapes get a new paragraph
/// list inside their original text body.
fn render_loaded_shape(shape: &Shape) -> Result<String> {
    let Some(markup) = shape.markup() else {
        return render_shape(shape);
    };
    if !shape.is_text_modified() {
        return Ok(markup.xml.clone());
    }

    match (&markup.paragraphs, shape.text_frame()) {
        (Some(range), Some(frame)) => {
            let mut xml = String::with_capacity(markup.xml.len());
            xml.push_str(&markup.xml[..range.start]);
            xml.push_str(&render_paragraphs(&frame.paragraphs));
            xml.push_str(&markup.xml[range.end..]);
            Ok(xml)
        }
        _ => render_shape(shape),
    }
}

/// Full markup for a shape created in memory.
pub(crate) fn render_shape(shape: &Shape) -> Result<String> {
    let mut xml = String::new();
    let name = escape(shape.name.as_str());

    let (non_visual, geometry) = match &shape.kind {
        ShapeKind::TextBox => (r#"<p:cNvSpPr txBox="1"/><p:nvPr/>"#.to_string(), Some("rect")),
        ShapeKind::AutoShape(preset) => ("<p:cNvSpPr/><p:nvPr/>".to_string(), Some(preset.as_str())),
        ShapeKind::Placeholder { kind, idx } => {
            let mut ph = String::from("<p:ph");
            if let Some(kind) = kind.as_ooxml() {
                let _ = write!(ph, r#" type="{}""#, kind);
            }
            if *idx != 0 {
                let _ = write!(ph, r#" idx="{}""#, idx);
            }
            ph.push_str("/>");
            (
                format!(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{}</p:nvPr>"#, ph),
                shape.fill.map(|_| "rect"),
            )
        }
        other => {
            return Err(Error::Unsupported(format!(
                "Cannot render new shape of kind {:?}",
                other
            )));
        }
    };

    let _ = write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/>{}</p:nvSpPr><p:spPr>"#,
        shape.id, name, non_visual
    );
    if let Some(frame) = shape.frame {
        xml.push_str(&render_xfrm(&frame));
    }
    if let Some(preset) = geometry {
        let _ = write!(xml, r#"<a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#, preset);
    }
    match (shape.fill, &shape.kind) {
        (Some(fill), _) => {
            let _ = write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, fill.hex());
        }
        (None, ShapeKind::TextBox) => xml.push_str("<a:noFill/>"),
        _ => {}
    }
    if let ShapeKind::AutoShape(_) = shape.kind {
        xml.push_str("<a:ln><a:noFill/></a:ln>");
    }
    xml.push_str("</p:spPr>");

    if let Some(frame) = shape.text_frame() {
        xml.push_str(&render_text_body(frame));
    }
    xml.push_str("</p:sp>");
    Ok(xml)
}

fn render_xfrm(frame: &Rect) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.left.get(),
        frame.top.get(),
        frame.width.get(),
        frame.height.get()
    )
}

fn render_text_body(frame: &TextFrame) -> String {
    let mut xml = String::from("<p:txBody><a:bodyPr");
    let _ = write!(xml, r#" wrap="{}""#, if frame.word_wrap { "square" } else { "none" });
    if let Some(inset) = frame.inset_left {
        let _ = write!(xml, r#" lIns="{}""#, inset.get());
    }
    xml.push_str(r#" rtlCol="0""#);
    if let Some(anchor) = frame.anchor {
        let _ = write!(xml, r#" anchor="{}""#, anchor.as_ooxml());
    }
    xml.push_str("/><a:lstStyle/>");
    xml.push_str(&render_paragraphs(&frame.paragraphs));
    xml.push_str("</p:txBody>");
    xml
}

/// `a:p` elements for a paragraph list; an empty list yields one empty
/// paragraph, since a text body needs at least one.
pub(crate) fn render_paragraphs(paragraphs: &[Paragraph]) -> String {
    if paragraphs.is_empty() {
        return "<a:p/>".to_string();
    }

    let mut xml = String::new();
    for paragraph in paragraphs {
        xml.push_str("<a:p>");
        xml.push_str(&render_paragraph_props(paragraph));
        for run in &paragraph.runs {
            render_run(&mut xml, run);
        }
        xml.push_str("</a:p>");
    }
    xml
}

fn render_paragraph_props(paragraph: &Paragraph) -> String {
    let spacing = |tag: &str, points: Option<f64>| {
        points
            .map(|pt| format!(r#"<a:{tag}><a:spcPts val="{}"/></a:{tag}>"#, (pt * 100.0).round() as i64))
            .unwrap_or_default()
    };
    let children = format!(
        "{}{}",
        spacing("spcBef", paragraph.space_before),
        spacing("spcAft", paragraph.space_after)
    );

    let mut attrs = String::new();
    if paragraph.level > 0 {
        let _ = write!(attrs, r#" lvl="{}""#, paragraph.level);
    }
    if let Some(alignment) = paragraph.alignment {
        let _ = write!(attrs, r#" algn="{}""#, alignment.as_ooxml());
    }

    match (attrs.is_empty(), children.is_empty()) {
        (true, true) => String::new(),
        (_, true) => format!("<a:pPr{}/>", attrs),
        _ => format!("<a:pPr{}>{}</a:pPr>", attrs, children),
    }
}

/// A run, splitting embedded newlines into `a:br` elements.
fn render_run(xml: &mut String, run: &Run) {
    let props = render_run_props(&run.props);
    for (index, piece) in run.text.split('\n').enumerate() {
        if index > 0 {
            xml.push_str("<a:br>");
            xml.push_str(&props);
            xml.push_str("</a:br>");
        }
        if !piece.is_empty() {
            let _ = write!(xml, "<a:r>{}<a:t>{}</a:t></a:r>", props, escape(piece));
        }
    }
}

/// `a:rPr` with both the Latin (`a:latin`) and East Asian (`a:ea`) faces.
fn render_run_props(props: &RunProps) -> String {
    let mut xml = String::from(r#"<a:rPr lang="zh-CN" altLang="en-US""#);
    if let Some(size) = props.size {
        let _ = write!(xml, r#" sz="{}""#, (size * 100.0).round() as i64);
    }
    if let Some(bold) = props.bold {
        let _ = write!(xml, r#" b="{}""#, if bold { 1 } else { 0 });
    }
    xml.push_str(r#" dirty="0""#);

    let mut children = String::new();
    if let Some(color) = props.color {
        let _ = write!(children, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color.hex());
    }
    if let Some(latin) = &props.latin {
        let _ = write!(children, r#"<a:latin typeface="{}"/>"#, escape(latin.as_str()));
    }
    if let Some(east_asian) = &props.east_asian {
        let _ = write!(children, r#"<a:ea typeface="{}"/>"#, escape(east_asian.as_str()));
    }

    if children.is_empty() {
        xml.push_str("/>");
    } else {
        let _ = write!(xml, ">{}</a:rPr>", children);
    }
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PptxParser;
    use deck_core::style::{StyleConfig, TextRole};
    use deck_core::types::LAYOUT_TITLE_ONLY;
    use deck_core::{
        DeckBuilder, Emu, Locator, PatchRule, PatchSet, Patcher, Region, Replacement, SlidePatch,
        SlideSelector, SlideSpec,
    };
    use std::io::Cursor;

    fn save_and_load(doc: &Document) -> Document {
        let bytes = PptxWriter::new()
            .write(doc, Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        PptxParser::new().parse(Cursor::new(bytes)).unwrap()
    }

    fn two_slides() -> Document {
        DeckBuilder::default()
            .build_slides(&[
                SlideSpec::bullets("A", vec!["x", "y"]),
                SlideSpec::bullets("B", vec!["z"]),
            ])
            .unwrap()
    }

    #[test]
    fn test_run_props_order() {
        let style = StyleConfig::default().text_style(TextRole::MetricValue);
        let xml = render_run_props(&RunProps::from(&style));
        assert_eq!(
            xml,
            r#"<a:rPr lang="zh-CN" altLang="en-US" sz="2200" b="1" dirty="0"><a:solidFill><a:srgbClr val="DC3232"/></a:solidFill><a:latin typeface="Inter"/><a:ea typeface="HarmonyOS Sans SC"/></a:rPr>"#
        );
    }

    #[test]
    fn test_render_paragraphs() {
        assert_eq!(render_paragraphs(&[]), "<a:p/>");

        let paragraph = Paragraph {
            runs: vec![Run {
                text: "a & b\nc".to_string(),
                ..Default::default()
            }],
            level: 1,
            space_after: Some(10.0),
            ..Default::default()
        };
        let xml = render_paragraphs(&[paragraph]);
        assert!(xml.starts_with(r#"<a:p><a:pPr lvl="1"><a:spcAft><a:spcPts val="1000"/></a:spcAft></a:pPr>"#));
        assert!(xml.contains("<a:t>a &amp; b</a:t>"));
        assert!(xml.contains("<a:br>"));
        assert!(xml.contains("<a:t>c</a:t>"));
    }

    #[test]
    fn test_round_trip_keeps_order_titles_and_fonts() {
        let loaded = save_and_load(&two_slides());

        assert_eq!(loaded.slides.len(), 2);
        assert_eq!(loaded.slides[0].title().as_deref(), Some("A"));
        assert_eq!(loaded.slides[1].title().as_deref(), Some("B"));
        assert_eq!(loaded.slide_width, Emu::inches(13.333));
        assert_eq!(loaded.layouts.len(), 7);
        assert_eq!(loaded.layouts[LAYOUT_TITLE_ONLY].name, "Title Only");
        assert_eq!(loaded.slides[0].layout, LAYOUT_TITLE_ONLY);

        let bullets = loaded.slides[0]
            .shapes
            .iter()
            .find(|s| s.kind == ShapeKind::TextBox)
            .unwrap();
        assert_eq!(bullets.text(), "x\ny");
        let props = &bullets.text_frame().unwrap().paragraphs[0].runs[0].props;
        assert_eq!(props.latin.as_deref(), Some("Inter"));
        assert_eq!(props.east_asian.as_deref(), Some("HarmonyOS Sans SC"));
        assert_eq!(props.size, Some(16.0));

        let title = loaded.slides[0].shapes.iter().find(|s| s.is_title()).unwrap();
        assert_eq!(title.fill, Some(StyleConfig::default().palette.primary));
    }

    #[test]
    fn test_untouched_shapes_are_verbatim() {
        let mut loaded = save_and_load(&two_slides());
        let original: Vec<String> = loaded.slides[0]
            .shapes
            .iter()
            .map(|s| s.markup().unwrap().xml.clone())
            .collect();

        let style = StyleConfig::default().text_style(TextRole::Bullet);
        loaded.slides[0].shapes[1].replace_text(&["changed"], &style, None);

        let bytes = PptxWriter::new()
            .write(&loaded, Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        let package = crate::package::read_package(Cursor::new(bytes)).unwrap();
        let slide = crate::package::part_text(&package, "ppt/slides/slide1.xml").unwrap();

        assert!(slide.contains(&original[0]));
        assert!(!slide.contains(&original[1]));
        assert!(slide.contains("<a:t>changed</a:t>"));

        let source = loaded.source().unwrap();
        assert_eq!(
            package.part("ppt/theme/theme1.xml"),
            source.part("ppt/theme/theme1.xml")
        );
        let slide2 = package.part("ppt/slides/slide2.xml").map(|b| b.to_vec());
        assert_eq!(slide2.as_deref(), source.part("ppt/slides/slide2.xml"));
    }

    #[test]
    fn test_delete_persists_after_reload() {
        let mut doc = Document::new(Emu::inches(13.333), Emu::inches(7.5));
        let style = StyleConfig::default().text_style(TextRole::Bullet);
        let slide = doc.add_slide(LAYOUT_TITLE_ONLY).unwrap();
        slide.title_shape_mut().unwrap().replace_text(&["交接中心"], &style, None);
        slide
            .add_text_box(deck_core::Rect::inches(0.0, 3.0, 4.0, 1.0))
            .replace_text(&["old metrics 247"], &style, None);
        slide
            .add_text_box(deck_core::Rect::inches(0.0, 4.5, 4.0, 1.0))
            .replace_text(&["keep me"], &style, None);

        let mut loaded = save_and_load(&doc);
        let set = PatchSet {
            slides: vec![SlidePatch {
                label: "handover".to_string(),
                select: SlideSelector::heading("交接中心", Region::any()),
                rules: vec![PatchRule::new(
                    "old metrics",
                    Locator::new()
                        .within(Region::any().left_below(Emu::inches(5.0)).top_above(Emu::inches(2.0)))
                        .containing("247"),
                    Replacement::Delete,
                )],
            }],
            ..Default::default()
        };
        let report = Patcher::default().apply(&mut loaded, &set).unwrap();
        assert_eq!(report.removed(), 1);

        let reloaded = save_and_load(&loaded);
        let texts = reloaded.slides[0].texts();
        assert!(texts.iter().all(|t| !t.contains("247")));
        assert!(texts.contains(&"keep me".to_string()));
        assert!(texts.contains(&"交接中心".to_string()));
    }

    #[test]
    fn test_appending_to_loaded_document_is_rejected() {
        let mut loaded = save_and_load(&two_slides());
        loaded.add_slide(LAYOUT_TITLE_ONLY).unwrap();

        let result = PptxWriter::new().write(&loaded, Cursor::new(Vec::new()));
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_new_shape_on_loaded_slide() {
        let mut loaded = save_and_load(&two_slides());
        let style = StyleConfig::default().text_style(TextRole::Insight);
        loaded.slides[1]
            .add_text_box(deck_core::Rect::inches(8.5, 2.0, 4.0, 1.0))
            .replace_text(&["新增"], &style, None);
        let fill = StyleConfig::default().palette.primary;
        loaded.slides[1].add_rectangle(deck_core::Rect::inches(0.0, 7.0, 13.333, 0.5), fill);

        let reloaded = save_and_load(&loaded);
        let slide = &reloaded.slides[1];
        assert!(slide.texts().contains(&"新增".to_string()));

        let band = slide.shapes.last().unwrap();
        assert_eq!(band.kind, ShapeKind::AutoShape("rect".to_string()));
        assert_eq!(band.fill, Some(fill));
        assert_eq!(band.frame.unwrap().top, Emu::inches(7.0));
    }
}
