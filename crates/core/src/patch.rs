//! Best-effort patching of an existing document.
//!
//! A [`PatchSet`] lists slide patches; each selects one slide and carries
//! rules that locate shapes on it and replace or delete them. Rules that find
//! nothing are reported and skipped, and the rest still apply.

use crate::error::{Error, Result};
use crate::locator::{Locator, SlideSelector};
use crate::outline::snippet;
use crate::style::{StyleConfig, TextRole};
use crate::types::{Document, Slide};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What to do with a matched shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Replacement {
    /// Clear the text and write one paragraph per line in the role's style.
    Text {
        lines: Vec<String>,
        #[serde(default = "default_text_role")]
        role: TextRole,
    },
    /// Replace the text with a single metric value.
    Scalar { value: String },
    /// Detach the shape from its slide.
    Delete,
}

fn default_text_role() -> TextRole {
    TextRole::Bullet
}

/// How many of a rule's matches to act on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// The first match wins.
    #[default]
    First,
    /// Every matching shape.
    All,
}

/// What happens when one shape is matched by several rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Apply rules in order; a later replacement overwrites an earlier one.
    #[default]
    LastWins,
    /// Refuse to patch anything and report the ambiguity.
    Reject,
}

/// A locator paired with the replacement to apply to what it finds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchRule {
    /// Name used in diagnostics.
    pub label: String,
    pub locator: Locator,
    pub action: Replacement,
    #[serde(default)]
    pub matches: MatchMode,
}

impl PatchRule {
    /// A first-match rule.
    pub fn new(label: impl Into<String>, locator: Locator, action: Replacement) -> Self {
        Self {
            label: label.into(),
            locator,
            action,
            matches: MatchMode::First,
        }
    }

    /// Builder method: act on every match instead of the first.
    pub fn all_matches(mut self) -> Self {
        self.matches = MatchMode::All;
        self
    }

    /// Ids of the shapes this rule acts on.
    fn resolve(&self, slide: &Slide) -> Vec<u32> {
        let positions = match self.matches {
            MatchMode::First => self.locator.find_first(slide).into_iter().collect(),
            MatchMode::All => self.locator.find_all(slide),
        };
        positions.into_iter().map(|i| slide.shapes[i].id).collect()
    }
}

/// Rules for one slide, found through a selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlidePatch {
    /// Name used in diagnostics.
    pub label: String,
    pub select: SlideSelector,
    pub rules: Vec<PatchRule>,
}

/// A complete set of slide patches with its overlap policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchSet {
    #[serde(default)]
    pub policy: OverlapPolicy,
    pub slides: Vec<SlidePatch>,
}

/// One diagnostic produced while patching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchEvent {
    SlideFound { patch: String, slide: usize },
    SlideNotFound { patch: String },
    Updated { slide: usize, rule: String, shape: String },
    Removed { slide: usize, rule: String, shape: String },
    NoMatch { slide: usize, rule: String, locator: String },
    Skipped { slide: usize, rule: String, shape: String, reason: String },
}

impl fmt::Display for PatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlideFound { patch, slide } => {
                write!(f, "Found '{}' slide at index {}", patch, slide)
            }
            Self::SlideNotFound { patch } => write!(f, "No slide found for '{}'; skipped", patch),
            Self::Updated { slide, rule, shape } => {
                write!(f, "Slide {}: updated {} ({})", slide, rule, shape)
            }
            Self::Removed { slide, rule, shape } => {
                write!(f, "Slide {}: removed {} ({})", slide, shape, rule)
            }
            Self::NoMatch {
                slide,
                rule,
                locator,
            } => write!(
                f,
                "Slide {}: no shape matched {} [{}]; skipped",
                slide, rule, locator
            ),
            Self::Skipped {
                slide,
                rule,
                shape,
                reason,
            } => write!(f, "Slide {}: skipped {} on {}: {}", slide, rule, shape, reason),
        }
    }
}

/// Everything that happened during a patch pass, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub events: Vec<PatchEvent>,
}

impl PatchReport {
    /// Number of shapes whose text was replaced.
    pub fn updated(&self) -> usize {
        self.count(|e| matches!(e, PatchEvent::Updated { .. }))
    }

    /// Number of shapes removed.
    pub fn removed(&self) -> usize {
        self.count(|e| matches!(e, PatchEvent::Removed { .. }))
    }

    /// Number of rules or slide patches that did not apply.
    pub fn skipped(&self) -> usize {
        self.count(|e| {
            matches!(
                e,
                PatchEvent::SlideNotFound { .. } | PatchEvent::NoMatch { .. } | PatchEvent::Skipped { .. }
            )
        })
    }

    /// Whether every slide patch and rule applied.
    pub fn is_complete(&self) -> bool {
        self.skipped() == 0
    }

    fn count<F: Fn(&PatchEvent) -> bool>(&self, f: F) -> usize {
        self.events.iter().filter(|e| f(e)).count()
    }

    fn push(&mut self, event: PatchEvent) {
        log::debug!("{}", event);
        self.events.push(event);
    }
}

/// Applies patch sets to documents.
#[derive(Debug, Clone, Default)]
pub struct Patcher {
    style: StyleConfig,
}

impl Patcher {
    /// Create a patcher styling replacement text with `style`.
    pub fn new(style: StyleConfig) -> Self {
        Self { style }
    }

    /// Apply every slide patch in order.
    ///
    /// Every rule is resolved against the document as it was before any
    /// change, and targets are tracked by shape id, so several slide patches
    /// may select the same slide. With [`OverlapPolicy::Reject`], a shape
    /// claimed by more than one rule aborts the whole pass before anything is
    /// mutated.
    pub fn apply(&self, doc: &mut Document, set: &PatchSet) -> Result<PatchReport> {
        let plans: Vec<Option<SlidePlan>> = set
            .slides
            .iter()
            .map(|patch| {
                let index = doc.slides.iter().position(|s| patch.select.selects(s))?;
                let targets = patch
                    .rules
                    .iter()
                    .map(|rule| rule.resolve(&doc.slides[index]))
                    .collect();
                Some(SlidePlan { index, targets })
            })
            .collect();

        if set.policy == OverlapPolicy::Reject {
            check_overlap(doc, set, &plans)?;
        }

        let mut report = PatchReport::default();
        for (patch, plan) in set.slides.iter().zip(&plans) {
            match plan {
                Some(plan) => {
                    report.push(PatchEvent::SlideFound {
                        patch: patch.label.clone(),
                        slide: plan.index,
                    });
                    self.apply_rules(&mut doc.slides[plan.index], plan, patch, &mut report);
                }
                None => report.push(PatchEvent::SlideNotFound {
                    patch: patch.label.clone(),
                }),
            }
        }

        Ok(report)
    }

    /// Apply one slide patch's resolved rules. Deletions happen last; a
    /// target that no longer exists is skipped.
    fn apply_rules(
        &self,
        slide: &mut Slide,
        plan: &SlidePlan,
        patch: &SlidePatch,
        report: &mut PatchReport,
    ) {
        let index = plan.index;
        let mut doomed: Vec<u32> = Vec::new();

        for (rule, targets) in patch.rules.iter().zip(&plan.targets) {
            if targets.is_empty() {
                report.push(PatchEvent::NoMatch {
                    slide: index,
                    rule: rule.label.clone(),
                    locator: rule.locator.describe(),
                });
                continue;
            }

            for &id in targets {
                let Some(shape) = slide.shapes.iter_mut().find(|s| s.id == id) else {
                    report.push(PatchEvent::Skipped {
                        slide: index,
                        rule: rule.label.clone(),
                        shape: format!("shape {}", id),
                        reason: "shape already removed".to_string(),
                    });
                    continue;
                };
                let shape_label = format!("{} \"{}\"", shape.name, snippet(&shape.text(), 24));

                if doomed.contains(&id) {
                    report.push(PatchEvent::Skipped {
                        slide: index,
                        rule: rule.label.clone(),
                        shape: shape_label,
                        reason: "shape already removed".to_string(),
                    });
                    continue;
                }

                let (lines, role) = match &rule.action {
                    Replacement::Delete => {
                        doomed.push(id);
                        report.push(PatchEvent::Removed {
                            slide: index,
                            rule: rule.label.clone(),
                            shape: shape_label,
                        });
                        continue;
                    }
                    Replacement::Text { lines, role } => (lines.clone(), *role),
                    Replacement::Scalar { value } => (vec![value.clone()], TextRole::MetricValue),
                };

                let style = self.style.text_style(role);
                if shape.replace_text(&lines, &style, self.style.space_after(role)) {
                    report.push(PatchEvent::Updated {
                        slide: index,
                        rule: rule.label.clone(),
                        shape: shape_label,
                    });
                } else {
                    report.push(PatchEvent::Skipped {
                        slide: index,
                        rule: rule.label.clone(),
                        shape: shape_label,
                        reason: "shape has no text frame".to_string(),
                    });
                }
            }
        }

        for id in doomed {
            slide.remove_shape(id);
        }
    }
}

/// Where one slide patch landed and the shape ids each of its rules targets.
struct SlidePlan {
    index: usize,
    targets: Vec<Vec<u32>>,
}

/// Fail if any shape is targeted by more than one rule, across every slide
/// patch that selected its slide.
fn check_overlap(doc: &Document, set: &PatchSet, plans: &[Option<SlidePlan>]) -> Result<()> {
    let mut claims: BTreeMap<(usize, u32), Vec<String>> = BTreeMap::new();
    for (patch, plan) in set.slides.iter().zip(plans) {
        let Some(plan) = plan else { continue };
        for (rule, targets) in patch.rules.iter().zip(&plan.targets) {
            for &id in targets {
                claims
                    .entry((plan.index, id))
                    .or_default()
                    .push(rule.label.clone());
            }
        }
    }

    match claims.into_iter().find(|(_, rules)| rules.len() > 1) {
        Some(((slide, id), rules)) => {
            let shape = doc.slides[slide]
                .shapes
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| format!("shape {}", id));
            Err(Error::AmbiguousMatch {
                slide,
                shape,
                rules,
            })
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Region;
    use crate::types::{Shape, LAYOUT_BLANK};
    use crate::units::{Emu, Rect};

    fn deck() -> Document {
        let style = StyleConfig::default().text_style(TextRole::Bullet);
        let mut doc = Document::new(Emu::inches(13.333), Emu::inches(7.5));
        let slide = doc.add_slide(LAYOUT_BLANK).unwrap();
        for (left, top, text) in [
            (0.5, 0.4, "交接中心"),
            (0.0, 3.0, "old metrics 247"),
            (0.5, 2.3, "业务支撑：旧内容"),
            (9.0, 2.3, "支撑营收"),
        ] {
            let id = slide.next_shape_id();
            let mut shape = Shape::text_box(id, Rect::inches(left, top, 3.0, 0.5));
            shape.replace_text(&[text], &style, None);
            slide.shapes.push(shape);
        }
        doc
    }

    fn selector() -> SlideSelector {
        SlideSelector::heading("交接中心", Region::any().top_below(Emu::inches(1.5)))
    }

    fn patch(rules: Vec<PatchRule>) -> PatchSet {
        PatchSet {
            policy: OverlapPolicy::LastWins,
            slides: vec![SlidePatch {
                label: "交接中心".to_string(),
                select: selector(),
                rules,
            }],
        }
    }

    fn left_body() -> Locator {
        Locator::new()
            .within(Region::any().left_below(Emu::inches(5.0)).top_above(Emu::inches(2.0)))
            .containing("业务支撑")
    }

    fn texts(doc: &Document) -> Vec<String> {
        doc.slides[0].texts()
    }

    #[test]
    fn test_delete_scenario() {
        let mut doc = deck();
        let rule = PatchRule::new(
            "old metrics",
            Locator::new()
                .within(Region::any().left_below(Emu::inches(5.0)).top_above(Emu::inches(2.0)))
                .containing("247"),
            Replacement::Delete,
        );
        let before: Vec<String> = texts(&doc)
            .into_iter()
            .filter(|t| !t.contains("247"))
            .collect();

        let report = Patcher::default().apply(&mut doc, &patch(vec![rule])).unwrap();

        assert_eq!(report.removed(), 1);
        assert_eq!(texts(&doc), before);
        assert!(doc.slides[0].shapes.iter().all(|s| !s.text().contains("247")));
    }

    #[test]
    fn test_full_replace() {
        let mut doc = deck();
        let lines = vec!["流程标准化".to_string(), "资产管理".to_string()];
        let rule = PatchRule::new(
            "work content",
            left_body(),
            Replacement::Text {
                lines: lines.clone(),
                role: TextRole::Bullet,
            },
        );

        let report = Patcher::default().apply(&mut doc, &patch(vec![rule])).unwrap();

        assert_eq!(report.updated(), 1);
        assert!(report.is_complete());
        let shape = &doc.slides[0].shapes[2];
        assert_eq!(shape.text(), "流程标准化\n资产管理");
        assert!(!shape.text().contains("旧内容"));
        assert!(shape.is_text_modified());
        let run = &shape.text_frame().unwrap().paragraphs[0].runs[0];
        assert_eq!(run.props.latin.as_deref(), Some("Inter"));
        assert_eq!(run.props.east_asian.as_deref(), Some("HarmonyOS Sans SC"));
        assert_eq!(run.props.size, Some(16.0));
    }

    #[test]
    fn test_full_replace_is_idempotent() {
        let mut doc = deck();
        let rule = PatchRule::new(
            "work content",
            Locator::new().within(Region::any().left_below(Emu::inches(5.0)).top_above(Emu::inches(2.0))),
            Replacement::Text {
                lines: vec!["one".to_string(), "two".to_string()],
                role: TextRole::Bullet,
            },
        )
        .all_matches();
        let set = patch(vec![rule]);

        Patcher::default().apply(&mut doc, &set).unwrap();
        let first = texts(&doc);
        Patcher::default().apply(&mut doc, &set).unwrap();
        assert_eq!(texts(&doc), first);
        assert_eq!(doc.slides[0].shapes[2].text(), "one\ntwo");
    }

    #[test]
    fn test_no_match_is_reported_and_skipped() {
        let mut doc = deck();
        let before = texts(&doc);
        let rule = PatchRule::new(
            "missing",
            Locator::new().containing("不存在"),
            Replacement::Delete,
        );

        let report = Patcher::default().apply(&mut doc, &patch(vec![rule])).unwrap();

        assert_eq!(texts(&doc), before);
        assert_eq!(report.skipped(), 1);
        assert!(matches!(report.events[1], PatchEvent::NoMatch { .. }));
    }

    #[test]
    fn test_missing_slide_still_applies_rest() {
        let mut doc = deck();
        let mut set = patch(vec![PatchRule::new(
            "metric",
            Locator::new().containing("247"),
            Replacement::Scalar {
                value: "247人天".to_string(),
            },
        )]);
        set.slides.insert(
            0,
            SlidePatch {
                label: "桌面布局".to_string(),
                select: SlideSelector::heading("桌面布局", Region::any()),
                rules: vec![PatchRule::new("x", Locator::new(), Replacement::Delete)],
            },
        );

        let report = Patcher::default().apply(&mut doc, &set).unwrap();

        assert_eq!(
            report.events[0],
            PatchEvent::SlideNotFound {
                patch: "桌面布局".to_string()
            }
        );
        assert_eq!(report.updated(), 1);
        let shape = &doc.slides[0].shapes[1];
        assert_eq!(shape.text(), "247人天");
        let props = &shape.text_frame().unwrap().paragraphs[0].runs[0].props;
        assert_eq!(props.bold, Some(true));
        assert_eq!(props.size, Some(22.0));
    }

    #[test]
    fn test_overlap_last_wins() {
        let mut doc = deck();
        let first = PatchRule::new(
            "first",
            left_body(),
            Replacement::Text {
                lines: vec!["first".to_string()],
                role: TextRole::Bullet,
            },
        );
        let second = PatchRule::new(
            "second",
            Locator::new().containing("旧内容"),
            Replacement::Text {
                lines: vec!["second".to_string()],
                role: TextRole::Insight,
            },
        );

        let report = Patcher::default()
            .apply(&mut doc, &patch(vec![first, second]))
            .unwrap();

        assert_eq!(report.updated(), 2);
        assert_eq!(doc.slides[0].shapes[2].text(), "second");
    }

    #[test]
    fn test_overlap_reject() {
        let mut doc = deck();
        let before = texts(&doc);
        let mut set = patch(vec![
            PatchRule::new("keep", left_body(), Replacement::Delete),
            PatchRule::new(
                "rewrite",
                Locator::new().containing("旧内容"),
                Replacement::Scalar {
                    value: "x".to_string(),
                },
            ),
        ]);
        set.policy = OverlapPolicy::Reject;

        let err = Patcher::default().apply(&mut doc, &set).unwrap_err();

        match err {
            Error::AmbiguousMatch { slide, rules, .. } => {
                assert_eq!(slide, 0);
                assert_eq!(rules, vec!["keep".to_string(), "rewrite".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(texts(&doc), before);
    }

    #[test]
    fn test_replace_after_delete_is_skipped() {
        let mut doc = deck();
        let set = patch(vec![
            PatchRule::new("drop", left_body(), Replacement::Delete),
            PatchRule::new(
                "rewrite",
                left_body(),
                Replacement::Scalar {
                    value: "x".to_string(),
                },
            ),
        ]);

        let report = Patcher::default().apply(&mut doc, &set).unwrap();

        assert_eq!(report.removed(), 1);
        assert!(matches!(report.events.last(), Some(PatchEvent::Skipped { .. })));
        assert_eq!(doc.slides[0].shapes.len(), 3);
    }

    fn second_patch(rules: Vec<PatchRule>) -> SlidePatch {
        SlidePatch {
            label: "交接中心 (metrics)".to_string(),
            select: selector(),
            rules,
        }
    }

    #[test]
    fn test_two_patches_on_one_slide() {
        let mut doc = deck();
        let mut set = patch(vec![PatchRule::new(
            "old metrics",
            Locator::new().containing("247"),
            Replacement::Delete,
        )]);
        set.slides.push(second_patch(vec![PatchRule::new(
            "revenue value",
            Locator::new().containing("支撑营收"),
            Replacement::Scalar {
                value: "千万级".to_string(),
            },
        )]));

        let report = Patcher::default().apply(&mut doc, &set).unwrap();

        assert_eq!(report.removed(), 1);
        assert_eq!(report.updated(), 1);
        assert!(report.is_complete());
        assert_eq!(texts(&doc), vec!["交接中心", "业务支撑：旧内容", "千万级"]);
        assert_eq!(doc.slides[0].shapes[2].frame, Some(Rect::inches(9.0, 2.3, 3.0, 0.5)));
    }

    #[test]
    fn test_later_patch_skips_removed_shape() {
        let mut doc = deck();
        let mut set = patch(vec![PatchRule::new("drop", left_body(), Replacement::Delete)]);
        set.slides.push(second_patch(vec![PatchRule::new(
            "rewrite",
            left_body(),
            Replacement::Scalar {
                value: "x".to_string(),
            },
        )]));

        let report = Patcher::default().apply(&mut doc, &set).unwrap();

        assert_eq!(report.removed(), 1);
        assert_eq!(report.updated(), 0);
        assert!(matches!(report.events.last(), Some(PatchEvent::Skipped { .. })));
        assert_eq!(texts(&doc), vec!["交接中心", "old metrics 247", "支撑营收"]);
    }

    #[test]
    fn test_overlap_reject_across_patches() {
        let mut doc = deck();
        let before = texts(&doc);
        let mut set = patch(vec![PatchRule::new("drop", left_body(), Replacement::Delete)]);
        set.slides.push(second_patch(vec![PatchRule::new(
            "rewrite",
            Locator::new().containing("旧内容"),
            Replacement::Scalar {
                value: "x".to_string(),
            },
        )]));
        set.policy = OverlapPolicy::Reject;

        let err = Patcher::default().apply(&mut doc, &set).unwrap_err();

        match err {
            Error::AmbiguousMatch { slide, rules, .. } => {
                assert_eq!(slide, 0);
                assert_eq!(rules, vec!["drop".to_string(), "rewrite".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(texts(&doc), before);
    }

    #[test]
    fn test_patch_set_from_json() {
        let json = r#"{
            "policy": "reject",
            "slides": [{
                "label": "handover",
                "select": {"contains_all": ["交接中心"], "region": {"top_below": "1.5in"}},
                "rules": [
                    {"label": "metrics", "locator": {"contains_any": ["247", "千万"]}, "action": "delete", "matches": "all"},
                    {"label": "value", "locator": {}, "action": {"scalar": {"value": "247人天"}}},
                    {"label": "body", "locator": {}, "action": {"text": {"lines": ["a"], "role": "insight"}}}
                ]
            }]
        }"#;

        let set: PatchSet = serde_json::from_str(json).unwrap();

        assert_eq!(set.policy, OverlapPolicy::Reject);
        let rules = &set.slides[0].rules;
        assert_eq!(rules[0].action, Replacement::Delete);
        assert_eq!(rules[0].matches, MatchMode::All);
        assert_eq!(rules[1].matches, MatchMode::First);
        assert_eq!(
            rules[2].action,
            Replacement::Text {
                lines: vec!["a".to_string()],
                role: TextRole::Insight
            }
        );
        assert_eq!(set.slides[0].select, selector());
    }

    #[test]
    fn test_event_display() {
        let event = PatchEvent::NoMatch {
            slide: 3,
            rule: "metrics".to_string(),
            locator: "contains '247'".to_string(),
        };
        assert_eq!(
            event.to_string(),
            "Slide 3: no shape matched metrics [contains '247']; skipped"
        );
    }
}
