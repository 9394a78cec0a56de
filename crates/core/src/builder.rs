//! Deck assembly from structured content.
//!
//! Every content slide uses the same fixed two-column layout: a filled title
//! bar, the first content block in the wide left column and every further
//! block stacked in the narrow right column. Positions, sizes and colours all
//! come from the [`StyleConfig`].

use crate::error::Result;
use crate::outline::{BulletItem, Metric};
use crate::style::{StyleConfig, TextRole};
use crate::types::{
    Alignment, Anchor, Document, Paragraph, Shape, Slide, LAYOUT_TITLE_ONLY, LAYOUT_TITLE_SLIDE,
};
use crate::units::{Emu, Rect};
use serde::{Deserialize, Serialize};

/// A section of a content slide: a header, bullets and optional metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentBlock {
    /// Section header; no header box is drawn when empty.
    pub header: String,
    /// Bullet lines; `* ` markers or indentation make sub-items.
    pub bullets: Vec<String>,
    /// Key metrics, `label：value` or a single line.
    pub metrics: Vec<String>,
}

impl ContentBlock {
    /// A block with a header and bullets.
    pub fn new<S: Into<String>>(header: impl Into<String>, bullets: Vec<S>) -> Self {
        Self {
            header: header.into(),
            bullets: bullets.into_iter().map(Into::into).collect(),
            metrics: Vec::new(),
        }
    }

    /// Builder method: attach metrics.
    pub fn with_metrics<S: Into<String>>(mut self, metrics: Vec<S>) -> Self {
        self.metrics = metrics.into_iter().map(Into::into).collect();
        self
    }
}

/// One content slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideSpec {
    pub title: String,
    pub blocks: Vec<ContentBlock>,
}

impl SlideSpec {
    /// A slide holding a single header-less block of bullets.
    pub fn bullets<S: Into<String>>(title: impl Into<String>, items: Vec<S>) -> Self {
        Self {
            title: title.into(),
            blocks: vec![ContentBlock::new("", items)],
        }
    }
}

/// Cover or closing slide text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cover {
    pub title: String,
    #[serde(default)]
    pub subtitle: Vec<String>,
}

/// Table-of-contents slide; indented entries are sub-entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agenda {
    pub title: String,
    pub entries: Vec<String>,
}

/// A whole deck: optional cover and agenda, content slides, optional closing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckSpec {
    pub cover: Option<Cover>,
    pub agenda: Option<Agenda>,
    pub slides: Vec<SlideSpec>,
    pub closing: Option<Cover>,
}

/// Builds documents from deck specifications.
#[derive(Debug, Clone, Default)]
pub struct DeckBuilder {
    style: StyleConfig,
}

impl DeckBuilder {
    /// Create a builder laying slides out with `style`.
    pub fn new(style: StyleConfig) -> Self {
        Self { style }
    }

    /// Build a complete deck.
    pub fn build(&self, spec: &DeckSpec) -> Result<Document> {
        let mut doc = self.empty_document();

        if let Some(cover) = &spec.cover {
            self.add_cover(&mut doc, cover)?;
        }
        if let Some(agenda) = &spec.agenda {
            self.add_agenda(&mut doc, agenda)?;
        }
        for slide in &spec.slides {
            self.add_content_slide(&mut doc, slide)?;
        }
        if let Some(closing) = &spec.closing {
            self.add_cover(&mut doc, closing)?;
        }

        log::debug!("Built deck with {} slides", doc.slides.len());
        Ok(doc)
    }

    /// Build a deck holding only content slides, one per slide description, in order.
    pub fn build_slides(&self, slides: &[SlideSpec]) -> Result<Document> {
        let mut doc = self.empty_document();
        for slide in slides {
            self.add_content_slide(&mut doc, slide)?;
        }
        Ok(doc)
    }

    fn empty_document(&self) -> Document {
        let geometry = &self.style.geometry;
        Document::new(geometry.slide_width, geometry.slide_height)
    }

    /// Title Slide layout: centred title and subtitle lines.
    pub fn add_cover(&self, doc: &mut Document, cover: &Cover) -> Result<()> {
        let title_style = self.style.text_style(TextRole::CoverTitle);
        let subtitle_style = self.style.text_style(TextRole::CoverSubtitle);
        let slide = doc.add_slide(LAYOUT_TITLE_SLIDE)?;

        if let Some(title) = slide.title_shape_mut() {
            set_paragraphs(
                title,
                vec![Paragraph::styled(&cover.title, &title_style).with_alignment(Alignment::Center)],
            );
        }
        if let Some(subtitle) = slide.placeholder_mut(1) {
            let paragraphs = cover
                .subtitle
                .iter()
                .map(|line| Paragraph::styled(line, &subtitle_style).with_alignment(Alignment::Center))
                .collect();
            set_paragraphs(subtitle, paragraphs);
        }

        log::debug!("Added cover slide '{}'", cover.title);
        Ok(())
    }

    /// Title bar plus one text box per agenda entry.
    pub fn add_agenda(&self, doc: &mut Document, agenda: &Agenda) -> Result<()> {
        let geometry = &self.style.geometry;
        let slide = doc.add_slide(LAYOUT_TITLE_ONLY)?;
        self.place_title_bar(slide, &agenda.title);

        let left = geometry.left_column_left + Emu::inches(1.0);
        let width = geometry.left_column_width;
        let mut top = geometry.content_top + Emu::inches(0.2);

        for entry in &agenda.entries {
            let item = BulletItem::parse(entry);
            let (role, indent, step) = if item.is_sub_item() {
                (TextRole::AgendaSubItem, Emu::inches(0.5), Emu::inches(0.4))
            } else {
                (TextRole::AgendaItem, Emu::ZERO, Emu::inches(0.6))
            };
            let style = self.style.text_style(role);
            let frame = Rect::new(left + indent, top, width, Emu::inches(0.5));
            set_paragraphs(
                slide.add_text_box(frame),
                vec![Paragraph::styled(&item.text, &style)],
            );
            top = top + step;
        }

        log::debug!("Added agenda with {} entries", agenda.entries.len());
        Ok(())
    }

    /// Title Only layout with the two-column content arrangement.
    pub fn add_content_slide(&self, doc: &mut Document, spec: &SlideSpec) -> Result<()> {
        let geometry = &self.style.geometry;
        let slide = doc.add_slide(LAYOUT_TITLE_ONLY)?;
        self.place_title_bar(slide, &spec.title);

        let mut blocks = spec.blocks.iter();
        if let Some(first) = blocks.next() {
            let column = Column {
                left: geometry.left_column_left,
                width: geometry.left_column_width,
            };
            self.place_block(slide, column, geometry.content_top, first, TextRole::Bullet);
        }

        let column = Column {
            left: geometry.right_column_left,
            width: geometry.right_column_width,
        };
        let mut top = geometry.content_top;
        for block in blocks {
            top = self.place_block(slide, column, top, block, TextRole::Insight) + geometry.block_gap;
        }

        log::debug!(
            "Added content slide '{}' with {} blocks",
            spec.title,
            spec.blocks.len()
        );
        Ok(())
    }

    /// Turn the layout's title placeholder into a filled title bar.
    fn place_title_bar(&self, slide: &mut Slide, title: &str) {
        let style = self.style.text_style(TextRole::Title);
        let geometry = &self.style.geometry;
        let fill = self.style.palette.primary;

        if let Some(shape) = slide.title_shape_mut() {
            shape.frame = Some(geometry.title_bar);
            shape.fill = Some(fill);
            set_paragraphs(shape, vec![Paragraph::styled(title, &style)]);
            if let Some(frame) = shape.text_frame_mut() {
                frame.anchor = Some(Anchor::Middle);
                frame.inset_left = Some(Emu::inches(0.2));
            }
        }
    }

    /// Stack a block's header, metrics and bullets from `top` down; returns
    /// the bottom edge of the last box.
    fn place_block(
        &self,
        slide: &mut Slide,
        column: Column,
        top: Emu,
        block: &ContentBlock,
        body_role: TextRole,
    ) -> Emu {
        let geometry = &self.style.geometry;
        let mut y = top;

        if !block.header.is_empty() {
            let role = if block.metrics.is_empty() {
                TextRole::SectionHeader
            } else {
                TextRole::MetricHeader
            };
            let style = self.style.text_style(role);
            let shape = slide.add_text_box(column.frame(y, geometry.header_height));
            set_paragraphs(shape, vec![Paragraph::styled(&block.header, &style)]);
            y = y + geometry.header_height;
        }

        for line in &block.metrics {
            let metric = Metric::parse(line);
            let parts = match &metric.label {
                Some(label) => vec![
                    (label.as_str(), TextRole::MetricLabel, geometry.metric_label_height),
                    (metric.value.as_str(), TextRole::MetricValue, geometry.metric_value_height),
                ],
                None => vec![(metric.value.as_str(), TextRole::MetricPlain, geometry.metric_plain_height)],
            };
            for (text, role, height) in parts {
                let style = self.style.text_style(role);
                let shape = slide.add_text_box(column.frame(y, height));
                set_paragraphs(shape, vec![Paragraph::styled(text, &style)]);
                y = y + height;
            }
        }

        if !block.bullets.is_empty() {
            let height = match body_role {
                TextRole::Insight => geometry.insights_height,
                _ => (geometry.column_height - (y - geometry.content_top))
                    .max(geometry.header_height),
            };
            let paragraphs = block
                .bullets
                .iter()
                .map(|line| self.bullet_paragraph(line, body_role))
                .collect();
            let shape = slide.add_text_box(column.frame(y, height));
            set_paragraphs(shape, paragraphs);
            y = y + height;
        }

        y
    }

    fn bullet_paragraph(&self, line: &str, body_role: TextRole) -> Paragraph {
        let item = BulletItem::parse(line);
        let role = if item.is_sub_item() && body_role == TextRole::Bullet {
            TextRole::SubBullet
        } else {
            body_role
        };
        Paragraph::styled(&item.text, &self.style.text_style(role))
            .with_level(item.depth)
            .with_space_after(self.style.space_after(role))
    }
}

/// Horizontal extent of a content column.
#[derive(Debug, Clone, Copy)]
struct Column {
    left: Emu,
    width: Emu,
}

impl Column {
    fn frame(&self, top: Emu, height: Emu) -> Rect {
        Rect::new(self.left, top, self.width, height)
    }
}

fn set_paragraphs(shape: &mut Shape, paragraphs: Vec<Paragraph>) {
    if let Some(frame) = shape.text_frame_mut() {
        frame.paragraphs = paragraphs;
    }
}
