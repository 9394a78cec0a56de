//! Shared styling configuration for the builder and the patcher.
//!
//! Colours, typefaces, font sizes and column geometry all live in one
//! [`StyleConfig`]. The patcher derives its column regions from the same
//! geometry the builder lays slides out with.

use crate::locator::Region;
use crate::units::{Emu, Rect, Rgb};
use serde::{Deserialize, Serialize};

/// The pair of typefaces a run needs: one for Latin/number glyphs, one for CJK glyphs.
///
/// PresentationML stores them separately (`a:latin` and `a:ea`), so a run that
/// only names the Latin face renders its CJK glyphs in the theme default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typefaces {
    pub latin: String,
    pub east_asian: String,
}

impl Default for Typefaces {
    fn default() -> Self {
        Self {
            latin: "Inter".to_string(),
            east_asian: "HarmonyOS Sans SC".to_string(),
        }
    }
}

/// Complete character formatting for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Size in points.
    pub size: f64,
    pub bold: bool,
    pub color: Rgb,
    pub typefaces: Typefaces,
}

/// What a piece of text is for; selects size, weight, colour and spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    Title,
    CoverTitle,
    CoverSubtitle,
    SectionHeader,
    MetricHeader,
    Bullet,
    SubBullet,
    Insight,
    MetricLabel,
    MetricValue,
    MetricPlain,
    AgendaItem,
    AgendaSubItem,
}

/// Deck colours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Title bars and section headers.
    pub primary: Rgb,
    /// Metrics and highlights.
    pub accent: Rgb,
    /// Body text.
    pub text: Rgb,
    /// Labels and sub-items.
    pub text_muted: Rgb,
    /// Text drawn on a primary-coloured fill.
    pub on_primary: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Rgb(0, 80, 158),
            accent: Rgb(220, 50, 50),
            text: Rgb(50, 50, 50),
            text_muted: Rgb(100, 100, 100),
            on_primary: Rgb::WHITE,
        }
    }
}

/// Font sizes in points, per role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub title: f64,
    pub cover_title: f64,
    pub cover_subtitle: f64,
    pub section_header: f64,
    pub bullet: f64,
    pub sub_bullet: f64,
    pub insight: f64,
    pub metric_label: f64,
    pub metric_value: f64,
    pub metric_plain: f64,
    pub agenda_item: f64,
    pub agenda_sub_item: f64,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 28.0,
            cover_title: 40.0,
            cover_subtitle: 20.0,
            section_header: 18.0,
            bullet: 16.0,
            sub_bullet: 14.0,
            insight: 14.0,
            metric_label: 12.0,
            metric_value: 22.0,
            metric_plain: 14.0,
            agenda_item: 20.0,
            agenda_sub_item: 16.0,
        }
    }
}

/// Slide size and the fixed two-column layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub slide_width: Emu,
    pub slide_height: Emu,
    /// Title bar placed at the top left of every content slide.
    pub title_bar: Rect,
    /// Top of both content columns.
    pub content_top: Emu,
    pub left_column_left: Emu,
    pub left_column_width: Emu,
    pub right_column_left: Emu,
    pub right_column_width: Emu,
    pub column_height: Emu,
    pub header_height: Emu,
    pub metric_label_height: Emu,
    pub metric_value_height: Emu,
    pub metric_plain_height: Emu,
    pub insights_height: Emu,
    /// Vertical gap between stacked right-column blocks.
    pub block_gap: Emu,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            slide_width: Emu::inches(13.333),
            slide_height: Emu::inches(7.5),
            title_bar: Rect::inches(0.5, 0.4, 10.0, 0.8),
            content_top: Emu::inches(1.8),
            left_column_left: Emu::inches(0.5),
            left_column_width: Emu::inches(7.5),
            right_column_left: Emu::inches(8.5),
            right_column_width: Emu::inches(4.3),
            column_height: Emu::inches(5.0),
            header_height: Emu::inches(0.5),
            metric_label_height: Emu::inches(0.3),
            metric_value_height: Emu::inches(0.5),
            metric_plain_height: Emu::inches(0.4),
            insights_height: Emu::inches(3.0),
            block_gap: Emu::inches(0.3),
        }
    }
}

impl Geometry {
    /// Horizontal boundary between the two columns.
    pub fn column_split(&self) -> Emu {
        Emu((self.left_column_left.get() + self.right_column_left.get()) / 2)
    }
}

/// One styling configuration shared by the builder and the patcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub palette: Palette,
    pub typefaces: Typefaces,
    pub sizes: FontSizes,
    pub geometry: Geometry,
}

impl StyleConfig {
    /// Character formatting for a role.
    pub fn text_style(&self, role: TextRole) -> TextStyle {
        let p = &self.palette;
        let s = &self.sizes;
        let (size, bold, color) = match role {
            TextRole::Title => (s.title, true, p.on_primary),
            TextRole::CoverTitle => (s.cover_title, true, p.primary),
            TextRole::CoverSubtitle => (s.cover_subtitle, false, p.text_muted),
            TextRole::SectionHeader => (s.section_header, true, p.primary),
            TextRole::MetricHeader => (s.section_header, true, p.accent),
            TextRole::Bullet => (s.bullet, false, p.text),
            TextRole::SubBullet => (s.sub_bullet, false, p.text_muted),
            TextRole::Insight => (s.insight, false, p.text),
            TextRole::MetricLabel => (s.metric_label, false, p.text_muted),
            TextRole::MetricValue => (s.metric_value, true, p.accent),
            TextRole::MetricPlain => (s.metric_plain, true, p.accent),
            TextRole::AgendaItem => (s.agenda_item, true, p.text),
            TextRole::AgendaSubItem => (s.agenda_sub_item, false, p.text),
        };

        TextStyle {
            size,
            bold,
            color,
            typefaces: self.typefaces.clone(),
        }
    }

    /// Space after each paragraph of a role, in points.
    pub fn space_after(&self, role: TextRole) -> Option<f64> {
        match role {
            TextRole::Bullet => Some(10.0),
            TextRole::SubBullet => Some(4.0),
            TextRole::Insight => Some(8.0),
            _ => None,
        }
    }

    /// Shapes whose top edge sits above the content columns (title bars, headings).
    pub fn header_band(&self) -> Region {
        Region::any().top_below(self.geometry.content_top)
    }

    /// Shapes in the left content column, below its section header.
    pub fn left_column(&self) -> Region {
        Region::any()
            .left_below(self.geometry.column_split())
            .top_above(self.geometry.content_top)
    }

    /// Shapes anywhere in the right column below the title bar.
    pub fn right_column(&self) -> Region {
        Region::any()
            .left_above(self.geometry.column_split())
            .top_above(self.geometry.title_bar.bottom())
    }
}
