//! Built-in corrections for the handover and desktop layout slides.
//!
//! Both slides were built with the wrong material. The handover slide loses
//! its metrics entirely; the desktop layout slide takes over the handover
//! figures by rewriting its metric boxes in place.

use deck_core::{
    Locator, PatchRule, PatchSet, Replacement, SlidePatch, SlideSelector, StyleConfig, TextRole,
};

/// Output name suffix for corrected decks.
pub const DEFAULT_SUFFIX: &str = "_Corrected";

/// The built-in patch set, with regions taken from `style`.
pub fn patch_set(style: &StyleConfig) -> PatchSet {
    PatchSet {
        slides: vec![handover(style), desktop(style)],
        ..PatchSet::default()
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn text(items: &[&str], role: TextRole) -> Replacement {
    Replacement::Text {
        lines: lines(items),
        role,
    }
}

fn handover(style: &StyleConfig) -> SlidePatch {
    let content = [
        "流程标准化：将运营商项目特有的认证信息、定制配置项纳入标准化线上交接流程。",
        "资产管理：统一管理关键项目资产，确保项目转手时信息的完整性与安全性。",
        "风险防控：消除因信息遗漏导致的项目延期风险。",
    ];
    let insights = [
        "无损传递：信息的完整交接是项目平稳过渡的基石，降低了跨团队协作的摩擦成本。",
        "流程即防线：标准化的交接流程是规避人为失误的最有效防线。",
    ];

    SlidePatch {
        label: "交接中心".to_string(),
        select: SlideSelector::heading("交接中心", style.header_band()),
        rules: vec![
            PatchRule::new(
                "work content",
                Locator::new()
                    .within(style.left_column())
                    .containing_any(["业务支撑", "配置灵活"]),
                text(&content, TextRole::Bullet),
            ),
            PatchRule::new(
                "insights",
                Locator::new()
                    .within(style.right_column())
                    .containing_any(["商业价值", "敏捷响应"]),
                text(&insights, TextRole::Insight),
            ),
            PatchRule::new(
                "metrics",
                Locator::new()
                    .within(style.right_column())
                    .containing_any(["关键成效", "247", "千万", "内部", "营收", "节省", "提升"])
                    .excluding("商业价值")
                    .excluding("敏捷响应"),
                Replacement::Delete,
            )
            .all_matches(),
        ],
    }
}

fn desktop(style: &StyleConfig) -> SlidePatch {
    let content = [
        "批量处理：支持对预装文件夹进行批量重命名，满足区域化定制需求。",
        "歧义消除：将 'Recommended Apps' 更名为中性的 'More Apps'，解决多语言显示歧义。",
        "商业支撑：快速响应 INS 预装业务需求，确保商务合同如期落地。",
    ];
    let insights = [
        "微小改动，重大价值：一个文件夹名称的修改，直接撬动了千万级别的商业合作。",
        "敏捷响应：技术平台对前端业务的直接驱动力，体现在对商业需求的快速落地能力上。",
    ];
    let right = || Locator::new().within(style.right_column());

    SlidePatch {
        label: "桌面布局".to_string(),
        select: SlideSelector::heading("桌面布局", style.header_band()),
        rules: vec![
            PatchRule::new(
                "work content",
                Locator::new()
                    .within(style.left_column())
                    .containing_any(["统一标准", "安全合规"]),
                text(&content, TextRole::Bullet),
            ),
            PatchRule::new(
                "insights",
                right().containing_any(["细节决定成败", "零事故"]),
                text(&insights, TextRole::Insight),
            ),
            PatchRule::new(
                "savings label",
                right().containing("安全").containing("风险"),
                text(&["内部节省"], TextRole::MetricLabel),
            ),
            PatchRule::new(
                "savings value",
                right().containing("100%覆盖").excluding("必须"),
                Replacement::Scalar {
                    value: "247人天".to_string(),
                },
            ),
            PatchRule::new(
                "revenue label",
                right().containing("合规事故"),
                text(&["支撑营收"], TextRole::MetricLabel),
            ),
            PatchRule::new(
                "revenue value",
                right().containing("0起"),
                Replacement::Scalar {
                    value: "千万级".to_string(),
                },
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::MatchMode;

    #[test]
    fn test_patch_set_shape() {
        let set = patch_set(&StyleConfig::default());
        assert_eq!(set.slides.len(), 2);
        assert_eq!(set.slides[0].rules.len(), 3);
        assert_eq!(set.slides[1].rules.len(), 6);
        assert_eq!(set.slides[0].rules[2].matches, MatchMode::All);
        assert_eq!(set.slides[0].rules[2].action, Replacement::Delete);
    }

    #[test]
    fn test_patch_set_serializes() {
        let set = patch_set(&StyleConfig::default());
        let json = serde_json::to_string(&set).unwrap();
        let back: PatchSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
