//! Declarative shape locators.
//!
//! A [`Locator`] combines a position test ([`Region`]) with substring tests on
//! the shape's current text. Both must hold for a shape to match.

use crate::outline::normalize_for_match;
use crate::types::{Shape, Slide};
use crate::units::Emu;
use serde::{Deserialize, Serialize};

/// Exclusive thresholds on a shape's top-left corner. Unset bounds always pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    pub left_below: Option<Emu>,
    pub left_above: Option<Emu>,
    pub top_below: Option<Emu>,
    pub top_above: Option<Emu>,
}

impl Region {
    /// A region containing every position.
    pub fn any() -> Self {
        Self::default()
    }

    /// Builder method: require `left < limit`.
    pub fn left_below(mut self, limit: Emu) -> Self {
        self.left_below = Some(limit);
        self
    }

    /// Builder method: require `left > limit`.
    pub fn left_above(mut self, limit: Emu) -> Self {
        self.left_above = Some(limit);
        self
    }

    /// Builder method: require `top < limit`.
    pub fn top_below(mut self, limit: Emu) -> Self {
        self.top_below = Some(limit);
        self
    }

    /// Builder method: require `top > limit`.
    pub fn top_above(mut self, limit: Emu) -> Self {
        self.top_above = Some(limit);
        self
    }

    /// Whether no bound is set.
    pub fn is_unbounded(&self) -> bool {
        *self == Self::default()
    }

    /// Whether a shape's frame lies in the region. Shapes without a frame only
    /// satisfy an unbounded region.
    pub fn contains(&self, shape: &Shape) -> bool {
        let Some(frame) = shape.frame else {
            return self.is_unbounded();
        };

        self.left_below.map_or(true, |limit| frame.left < limit)
            && self.left_above.map_or(true, |limit| frame.left > limit)
            && self.top_below.map_or(true, |limit| frame.top < limit)
            && self.top_above.map_or(true, |limit| frame.top > limit)
    }
}

/// A predicate identifying a target shape by position and text content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locator {
    pub region: Region,
    /// Every one of these must occur in the text.
    pub contains_all: Vec<String>,
    /// At least one of these must occur in the text, when any are given.
    pub contains_any: Vec<String>,
    /// None of these may occur in the text.
    pub excludes: Vec<String>,
}

impl Locator {
    /// A locator matching every shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the region.
    pub fn within(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Builder method: require a substring.
    pub fn containing(mut self, needle: impl Into<String>) -> Self {
        self.contains_all.push(needle.into());
        self
    }

    /// Builder method: require at least one of several substrings.
    pub fn containing_any<I, S>(mut self, needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contains_any.extend(needles.into_iter().map(Into::into));
        self
    }

    /// Builder method: forbid a substring.
    pub fn excluding(mut self, needle: impl Into<String>) -> Self {
        self.excludes.push(needle.into());
        self
    }

    fn has_text_tests(&self) -> bool {
        !(self.contains_all.is_empty() && self.contains_any.is_empty() && self.excludes.is_empty())
    }

    /// Whether a shape satisfies both the position and the text tests.
    pub fn matches(&self, shape: &Shape) -> bool {
        if !self.region.contains(shape) {
            return false;
        }

        if !self.has_text_tests() {
            return true;
        }

        if !shape.has_text_frame() {
            return false;
        }

        let text = normalize_for_match(&shape.text());
        let found = |needle: &String| text.contains(normalize_for_match(needle).as_str());

        self.contains_all.iter().all(found)
            && (self.contains_any.is_empty() || self.contains_any.iter().any(found))
            && !self.excludes.iter().any(found)
    }

    /// Indices of matching shapes on a slide, in z-order.
    pub fn find_all(&self, slide: &Slide) -> Vec<usize> {
        slide
            .shapes
            .iter()
            .enumerate()
            .filter(|(_, shape)| self.matches(shape))
            .map(|(index, _)| index)
            .collect()
    }

    /// Index of the first matching shape on a slide.
    pub fn find_first(&self, slide: &Slide) -> Option<usize> {
        slide.shapes.iter().position(|shape| self.matches(shape))
    }

    /// Short human-readable description for diagnostics.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        let r = &self.region;
        if let Some(v) = r.left_below {
            parts.push(format!("left<{}", v));
        }
        if let Some(v) = r.left_above {
            parts.push(format!("left>{}", v));
        }
        if let Some(v) = r.top_below {
            parts.push(format!("top<{}", v));
        }
        if let Some(v) = r.top_above {
            parts.push(format!("top>{}", v));
        }
        for needle in &self.contains_all {
            parts.push(format!("contains '{}'", needle));
        }
        if !self.contains_any.is_empty() {
            parts.push(format!("contains any of [{}]", self.contains_any.join(", ")));
        }
        for needle in &self.excludes {
            parts.push(format!("not '{}'", needle));
        }

        if parts.is_empty() {
            "any shape".to_string()
        } else {
            parts.join(" and ")
        }
    }
}

/// Selects the slide a group of rules applies to: the first slide with a
/// shape matching the locator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideSelector(pub Locator);

impl SlideSelector {
    /// Select the first slide carrying a heading that contains `needle`
    /// inside `band`.
    pub fn heading(needle: impl Into<String>, band: Region) -> Self {
        Self(Locator::new().within(band).containing(needle))
    }

    /// Whether a slide is selected.
    pub fn selects(&self, slide: &Slide) -> bool {
        slide.shapes.iter().any(|shape| self.0.matches(shape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{StyleConfig, TextRole};
    use crate::types::{Shape, Slide, LAYOUT_BLANK};
    use crate::units::Rect;

    fn text_shape(id: u32, left: f64, top: f64, text: &str) -> Shape {
        let style = StyleConfig::default().text_style(TextRole::Bullet);
        let mut shape = Shape::text_box(id, Rect::inches(left, top, 3.0, 1.0));
        shape.replace_text(&[text], &style, None);
        shape
    }

    #[test]
    fn test_region_thresholds_are_exclusive() {
        let shape = text_shape(2, 5.0, 2.0, "x");
        assert!(!Region::any().left_below(Emu::inches(5.0)).contains(&shape));
        assert!(Region::any().left_below(Emu::inches(5.1)).contains(&shape));
        assert!(!Region::any().top_above(Emu::inches(2.0)).contains(&shape));
        assert!(Region::any().top_above(Emu::inches(1.9)).contains(&shape));
    }

    #[test]
    fn test_region_without_frame() {
        let mut shape = text_shape(2, 0.0, 0.0, "x");
        shape.frame = None;
        assert!(Region::any().contains(&shape));
        assert!(!Region::any().top_below(Emu::inches(9.0)).contains(&shape));
    }

    #[test]
    fn test_locator_requires_position_and_text() {
        let locator = Locator::new()
            .within(Region::any().left_below(Emu::inches(5.0)).top_above(Emu::inches(2.0)))
            .containing("247");

        assert!(locator.matches(&text_shape(2, 0.0, 3.0, "old metrics 247")));
        assert!(!locator.matches(&text_shape(3, 0.0, 3.0, "old metrics")));
        assert!(!locator.matches(&text_shape(4, 9.0, 3.0, "old metrics 247")));
        assert!(!locator.matches(&text_shape(5, 0.0, 1.0, "old metrics 247")));
    }

    #[test]
    fn test_contains_any_and_excludes() {
        let locator = Locator::new()
            .containing_any(["247", "千万"])
            .excluding("心得");

        assert!(locator.matches(&text_shape(2, 0.0, 0.0, "支撑营收：千万级")));
        assert!(!locator.matches(&text_shape(3, 0.0, 0.0, "工作心得：千万级")));
        assert!(!locator.matches(&text_shape(4, 0.0, 0.0, "nothing here")));
    }

    #[test]
    fn test_matching_ignores_width_variants() {
        let locator = Locator::new().containing("内部协作节省:");
        assert!(locator.matches(&text_shape(2, 0.0, 0.0, "内部协作节省：247人天")));
    }

    #[test]
    fn test_text_tests_need_text_frame() {
        let picture = Shape::loaded(
            2,
            "Picture 1".to_string(),
            crate::types::ShapeKind::Picture,
            Some(Rect::inches(0.0, 0.0, 1.0, 1.0)),
            None,
            None,
            crate::types::ShapeMarkup {
                xml: "<p:pic/>".to_string(),
                paragraphs: None,
            },
        );
        assert!(Locator::new().matches(&picture));
        assert!(!Locator::new().excluding("x").matches(&picture));
    }

    #[test]
    fn test_find_on_slide() {
        let mut slide = Slide::new(LAYOUT_BLANK);
        slide.shapes.push(text_shape(2, 0.0, 3.0, "keep"));
        slide.shapes.push(text_shape(3, 0.0, 3.0, "old 247"));
        slide.shapes.push(text_shape(4, 0.0, 4.0, "also 247"));

        let locator = Locator::new().containing("247");
        assert_eq!(locator.find_first(&slide), Some(1));
        assert_eq!(locator.find_all(&slide), vec![1, 2]);

        let selector = SlideSelector::heading("keep", Region::any().top_below(Emu::inches(3.5)));
        assert!(selector.selects(&slide));
    }

    #[test]
    fn test_describe() {
        let locator = Locator::new()
            .within(Region::any().left_below(Emu::inches(5.0)))
            .containing("247");
        assert_eq!(locator.describe(), "left<5.00in and contains '247'");
        assert_eq!(Locator::new().describe(), "any shape");
    }
}
