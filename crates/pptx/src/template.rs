//! Fixed parts of a freshly written package.

use crate::rels::{
    internal, write_relationships, REL_CORE_PROPERTIES, REL_EXTENDED_PROPERTIES,
    REL_OFFICE_DOCUMENT, REL_PRES_PROPS, REL_SLIDE, REL_SLIDE_LAYOUT, REL_SLIDE_MASTER,
    REL_TABLE_STYLES, REL_THEME,
};
use crate::writer::render_shape;
use deck_core::types::{Document, Layout, PlaceholderKind, Shape};
use deck_core::{Rect, Result, Typefaces};
use quick_xml::escape::escape;
use std::fmt::Write as _;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
"#;

const NAMESPACES: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

const GROUP_PROPERTIES: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

/// Presentation relationship id of the first slide; ids below it are fixed parts.
const FIRST_SLIDE_REL: usize = 5;

const MASTER_ID: u64 = 2_147_483_648;
const FIRST_SLIDE_ID: usize = 256;

const CT_PREFIX: &str = "application/vnd.openxmlformats-officedocument.";

pub fn content_types(slide_count: usize, layout_count: usize) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);

    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), "presentationml.presentation.main+xml"),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), "presentationml.slideMaster+xml"),
        ("/ppt/theme/theme1.xml".to_string(), "theme+xml"),
        ("/ppt/presProps.xml".to_string(), "presentationml.presProps+xml"),
        ("/ppt/tableStyles.xml".to_string(), "presentationml.tableStyles+xml"),
        ("/docProps/app.xml".to_string(), "extended-properties+xml"),
    ];
    for n in 1..=layout_count {
        overrides.push((
            format!("/ppt/slideLayouts/slideLayout{}.xml", n),
            "presentationml.slideLayout+xml",
        ));
    }
    for n in 1..=slide_count {
        overrides.push((format!("/ppt/slides/slide{}.xml", n), "presentationml.slide+xml"));
    }

    for (part, content_type) in overrides {
        let _ = write!(
            xml,
            r#"<Override PartName="{}" ContentType="{}{}"/>"#,
            part, CT_PREFIX, content_type
        );
    }
    xml.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
    xml.push_str("</Types>");
    xml
}

pub fn package_rels() -> String {
    write_relationships(&[
        internal(1, REL_OFFICE_DOCUMENT, "ppt/presentation.xml"),
        internal(2, REL_CORE_PROPERTIES, "docProps/core.xml"),
        internal(3, REL_EXTENDED_PROPERTIES, "docProps/app.xml"),
    ])
}

pub fn core_properties(title: &str) -> String {
    format!(
        concat!(
            "{}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{}</dc:title><dc:creator>deck-tool</dc:creator><cp:revision>1</cp:revision>",
            "</cp:coreProperties>"
        ),
        XML_DECLARATION,
        escape(title)
    )
}

pub fn app_properties(slide_count: usize) -> String {
    format!(
        concat!(
            "{}",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            "<Application>deck-tool</Application><Slides>{}</Slides></Properties>"
        ),
        XML_DECLARATION, slide_count
    )
}

pub fn presentation(doc: &Document) -> String {
    let mut xml = String::from(XML_DECLARATION);
    let _ = write!(xml, r#"<p:presentation {} saveSubsetFonts="1">"#, NAMESPACES);
    let _ = write!(
        xml,
        r#"<p:sldMasterIdLst><p:sldMasterId id="{}" r:id="rId1"/></p:sldMasterIdLst>"#,
        MASTER_ID
    );

    if !doc.slides.is_empty() {
        xml.push_str("<p:sldIdLst>");
        for index in 0..doc.slides.len() {
            let _ = write!(
                xml,
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                FIRST_SLIDE_ID + index,
                FIRST_SLIDE_REL + index
            );
        }
        xml.push_str("</p:sldIdLst>");
    }

    let _ = write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/>"#,
        doc.slide_width.get(),
        doc.slide_height.get()
    );
    xml.push_str(r#"<p:defaultTextStyle><a:defPPr><a:defRPr lang="zh-CN"/></a:defPPr></p:defaultTextStyle>"#);
    xml.push_str("</p:presentation>");
    xml
}

pub fn presentation_rels(slide_count: usize) -> String {
    let mut rels = vec![
        internal(1, REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
        internal(2, REL_THEME, "theme/theme1.xml"),
        internal(3, REL_PRES_PROPS, "presProps.xml"),
        internal(4, REL_TABLE_STYLES, "tableStyles.xml"),
    ];
    for index in 0..slide_count {
        rels.push(internal(
            FIRST_SLIDE_REL + index,
            REL_SLIDE,
            format!("slides/slide{}.xml", index + 1),
        ));
    }
    write_relationships(&rels)
}

pub fn pres_props() -> String {
    format!("{}<p:presentationPr {}/>", XML_DECLARATION, NAMESPACES)
}

pub fn table_styles() -> String {
    format!(
        r#"{}<a:tblStyleLst xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#,
        XML_DECLARATION
    )
}

/// Office colour scheme with a font scheme naming both the Latin and the East
/// Asian face, so text without explicit run fonts still gets the deck faces.
pub fn theme(typefaces: &Typefaces) -> String {
    let fonts = format!(
        r#"<a:latin typeface="{}"/><a:ea typeface="{}"/><a:cs typeface=""/>"#,
        escape(typefaces.latin.as_str()),
        escape(typefaces.east_asian.as_str())
    );
    let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = format!(r#"<a:ln w="6350">{}</a:ln>"#, solid);
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";

    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Deck Theme"><a:themeElements>"#);
    xml.push_str(concat!(
        r#"<a:clrScheme name="Office">"#,
        r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
        r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
        r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
        r#"<a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2>"#,
        r#"<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4>"#,
        r#"<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6>"#,
        r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink>"#,
        "</a:clrScheme>"
    ));
    let _ = write!(
        xml,
        r#"<a:fontScheme name="Deck"><a:majorFont>{}</a:majorFont><a:minorFont>{}</a:minorFont></a:fontScheme>"#,
        fonts, fonts
    );
    let _ = write!(
        xml,
        concat!(
            r#"<a:fmtScheme name="Office">"#,
            "<a:fillStyleLst>{s}{s}{s}</a:fillStyleLst>",
            "<a:lnStyleLst>{l}{l}{l}</a:lnStyleLst>",
            "<a:effectStyleLst>{e}{e}{e}</a:effectStyleLst>",
            "<a:bgFillStyleLst>{s}{s}{s}</a:bgFillStyleLst>",
            "</a:fmtScheme>"
        ),
        s = solid,
        l = line,
        e = effect
    );
    xml.push_str("</a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>");
    xml
}

/// The single slide master: a title and a body placeholder taken from the
/// layout catalogue, the colour map, the layout list and text styles.
pub fn slide_master(doc: &Document) -> Result<String> {
    let find = |title: bool| {
        doc.layouts
            .iter()
            .flat_map(|layout| &layout.placeholders)
            .find(|p| p.kind.is_title() == title)
            .map(|p| p.frame)
            .unwrap_or_else(|| Rect::new(Default::default(), Default::default(), doc.slide_width, doc.slide_height))
    };

    let title = placeholder_markup(2, PlaceholderKind::Title, 0, find(true))?;
    let body = placeholder_markup(3, PlaceholderKind::Body, 1, find(false))?;

    let mut xml = String::from(XML_DECLARATION);
    let _ = write!(xml, "<p:sldMaster {}>", NAMESPACES);
    xml.push_str(r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#);
    let _ = write!(xml, "<p:spTree>{}{}{}</p:spTree></p:cSld>", GROUP_PROPERTIES, title, body);
    xml.push_str(concat!(
        r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
        r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#
    ));

    xml.push_str("<p:sldLayoutIdLst>");
    for index in 0..doc.layouts.len() {
        let _ = write!(
            xml,
            r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
            MASTER_ID + 1 + index as u64,
            index + 1
        );
    }
    xml.push_str("</p:sldLayoutIdLst>");

    let font = |kind: &str| {
        format!(
            r#"<a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+{k}-lt"/><a:ea typeface="+{k}-ea"/><a:cs typeface="+{k}-cs"/>"#,
            k = kind
        )
    };
    let _ = write!(
        xml,
        concat!(
            "<p:txStyles>",
            r#"<p:titleStyle><a:lvl1pPr algn="l"><a:defRPr sz="4400" kern="1200">{mj}</a:defRPr></a:lvl1pPr></p:titleStyle>"#,
            "<p:bodyStyle>",
            r#"<a:lvl1pPr marL="228600" indent="-228600"><a:defRPr sz="2800" kern="1200">{mn}</a:defRPr></a:lvl1pPr>"#,
            r#"<a:lvl2pPr marL="685800" indent="-228600"><a:defRPr sz="2400" kern="1200">{mn}</a:defRPr></a:lvl2pPr>"#,
            "</p:bodyStyle>",
            r#"<p:otherStyle><a:defPPr><a:defRPr lang="zh-CN"/></a:defPPr><a:lvl1pPr><a:defRPr sz="1800" kern="1200">{mn}</a:defRPr></a:lvl1pPr></p:otherStyle>"#,
            "</p:txStyles>"
        ),
        mj = font("mj"),
        mn = font("mn")
    );
    xml.push_str("</p:sldMaster>");
    Ok(xml)
}

pub fn slide_master_rels(layout_count: usize) -> String {
    let mut rels: Vec<_> = (1..=layout_count)
        .map(|n| internal(n, REL_SLIDE_LAYOUT, format!("../slideLayouts/slideLayout{}.xml", n)))
        .collect();
    rels.push(internal(layout_count + 1, REL_THEME, "../theme/theme1.xml"));
    write_relationships(&rels)
}

pub fn slide_layout(layout: &Layout) -> Result<String> {
    let mut shapes = String::new();
    for (index, placeholder) in layout.placeholders.iter().enumerate() {
        shapes.push_str(&placeholder_markup(
            index as u32 + 2,
            placeholder.kind.clone(),
            placeholder.idx,
            placeholder.frame,
        )?);
    }

    let mut xml = String::from(XML_DECLARATION);
    let _ = write!(xml, r#"<p:sldLayout {} preserve="1">"#, NAMESPACES);
    let _ = write!(
        xml,
        r#"<p:cSld name="{}"><p:spTree>{}{}</p:spTree></p:cSld>"#,
        escape(layout.name.as_str()),
        GROUP_PROPERTIES,
        shapes
    );
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>");
    Ok(xml)
}

pub fn slide_layout_rels() -> String {
    write_relationships(&[internal(1, REL_SLIDE_MASTER, "../slideMasters/slideMaster1.xml")])
}

/// A slide part around already rendered shapes.
pub fn slide(shapes: &str) -> String {
    format!(
        concat!(
            "{}<p:sld {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"
        ),
        XML_DECLARATION, NAMESPACES, GROUP_PROPERTIES, shapes
    )
}

pub fn slide_rels(layout: usize) -> String {
    write_relationships(&[internal(
        1,
        REL_SLIDE_LAYOUT,
        format!("../slideLayouts/slideLayout{}.xml", layout + 1),
    )])
}

fn placeholder_markup(id: u32, kind: PlaceholderKind, idx: u32, frame: Rect) -> Result<String> {
    let mut shape = Shape::placeholder(id, kind, idx);
    shape.frame = Some(frame);
    render_shape(&shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_shape_tree;
    use crate::rels::parse_relationships;
    use deck_core::Emu;

    #[test]
    fn test_theme_carries_both_faces() {
        let xml = theme(&Typefaces::default());
        assert!(xml.contains(r#"<a:latin typeface="Inter"/><a:ea typeface="HarmonyOS Sans SC"/>"#));
    }

    #[test]
    fn test_presentation_rels_match_slide_ids() {
        let doc = {
            let mut doc = Document::new(Emu::inches(13.333), Emu::inches(7.5));
            doc.add_slide(0).unwrap();
            doc.add_slide(5).unwrap();
            doc
        };
        let xml = presentation(&doc);
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId5"/><p:sldId id="257" r:id="rId6"/>"#));

        let rels = parse_relationships(&presentation_rels(2)).unwrap();
        let slide = rels.iter().find(|r| r.id == "rId6").unwrap();
        assert_eq!(slide.target, "slides/slide2.xml");
    }

    #[test]
    fn test_layout_parts_parse_back() {
        let layouts = Layout::standard_set(Emu::inches(13.333), Emu::inches(7.5));
        let xml = slide_layout(&layouts[1]).unwrap();
        let tree = parse_shape_tree(&xml).unwrap();
        assert_eq!(tree.name.as_deref(), Some("Title and Content"));
        assert_eq!(tree.shapes.len(), 2);
    }

    #[test]
    fn test_content_types_list_every_part() {
        let xml = content_types(3, 7);
        assert!(xml.contains("/ppt/slides/slide3.xml"));
        assert!(xml.contains("/ppt/slideLayouts/slideLayout7.xml"));
        assert!(!xml.contains("/ppt/slides/slide4.xml"));
    }
}
