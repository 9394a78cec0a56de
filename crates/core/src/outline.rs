//! Text helpers for outline-style content.
//!
//! Handles bullet markers and indentation, `label：value` metric lines, and
//! the normalization used when matching shape text.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Splits a line into indentation, an optional bullet marker and the body.
static BULLET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<indent>[ \t\u{3000}]*)(?:(?P<marker>[-*•◦·])\s+)?(?P<body>.*?)\s*$").unwrap()
});

/// Indentation (in columns) from which a line counts as a sub-item.
const SUB_ITEM_INDENT: usize = 2;

/// A bullet line with its nesting depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletItem {
    /// Text without marker or indentation.
    pub text: String,
    /// 0 for top-level items, 1 for sub-items.
    pub depth: u8,
}

impl BulletItem {
    /// Parse a source line.
    ///
    /// `*` and `◦` markers, or an indent of two columns or more, make a
    /// sub-item. `-`, `•` and `·` markers are stripped from top-level items.
    pub fn parse(line: &str) -> Self {
        let Some(caps) = BULLET_REGEX.captures(line) else {
            return Self {
                text: line.trim().to_string(),
                depth: 0,
            };
        };

        let indent: usize = caps
            .name("indent")
            .map(|m| m.as_str().chars().map(|c| if c == '\t' { 4 } else { 1 }).sum())
            .unwrap_or(0);
        let marker = caps.name("marker").map(|m| m.as_str());
        let body = caps.name("body").map(|m| m.as_str()).unwrap_or_default();

        let depth = match marker {
            Some("*") | Some("◦") => 1,
            _ if indent >= SUB_ITEM_INDENT => 1,
            _ => 0,
        };

        Self {
            text: body.to_string(),
            depth,
        }
    }

    /// Whether this is a sub-item.
    pub fn is_sub_item(&self) -> bool {
        self.depth > 0
    }
}

/// A key-metric line, optionally split into label and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub label: Option<String>,
    pub value: String,
}

impl Metric {
    /// Split `label：value` (full-width colon, or an ASCII colon followed by a
    /// space). Lines without a separator, or with an empty side, stay whole.
    pub fn parse(line: &str) -> Self {
        let split = line
            .split_once('：')
            .or_else(|| line.split_once(": "))
            .map(|(label, value)| (label.trim(), value.trim()))
            .filter(|(label, value)| !label.is_empty() && !value.is_empty());

        match split {
            Some((label, value)) => Self {
                label: Some(label.to_string()),
                value: value.to_string(),
            },
            None => Self {
                label: None,
                value: line.trim().to_string(),
            },
        }
    }
}

/// Normalize text for substring matching (NFKC), so full-width and half-width
/// forms of the same character compare equal.
pub fn normalize_for_match(text: &str) -> String {
    text.nfkc().collect()
}

/// A single-line preview of at most `max_chars` characters.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\u{b}' { ' ' } else { c })
        .collect();

    if flat.chars().count() > max_chars {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_top_level_bullets() {
        assert_eq!(
            BulletItem::parse("- 定位：好用的日志在线分析工具"),
            BulletItem {
                text: "定位：好用的日志在线分析工具".to_string(),
                depth: 0
            }
        );
        assert_eq!(BulletItem::parse("plain line  ").text, "plain line");
        assert_eq!(BulletItem::parse("• dot").depth, 0);
    }

    #[test]
    fn test_parse_sub_items() {
        let item = BulletItem::parse("* 核心价值：支持多人在线实时编辑");
        assert!(item.is_sub_item());
        assert_eq!(item.text, "核心价值：支持多人在线实时编辑");

        let item = BulletItem::parse("    1.1 vCube 协作平台");
        assert!(item.is_sub_item());
        assert_eq!(item.text, "1.1 vCube 协作平台");

        assert!(BulletItem::parse("\tindented").is_sub_item());
    }

    #[test]
    fn test_marker_needs_whitespace() {
        let item = BulletItem::parse("-5% 成本");
        assert_eq!(item.text, "-5% 成本");
        assert_eq!(item.depth, 0);
    }

    #[test]
    fn test_metric_split() {
        assert_eq!(
            Metric::parse("内部协作节省：247人天"),
            Metric {
                label: Some("内部协作节省".to_string()),
                value: "247人天".to_string()
            }
        );
        assert_eq!(
            Metric::parse("Uptime: 99.99%").label.as_deref(),
            Some("Uptime")
        );
        assert_eq!(Metric::parse("12:30 deadline").label, None);
        assert_eq!(Metric::parse("：only value").label, None);
    }

    #[test]
    fn test_normalize_for_match() {
        assert_eq!(normalize_for_match("ＡＢＣ：１２"), "ABC:12");
        assert_eq!(normalize_for_match("交接中心"), "交接中心");
    }

    #[test]
    fn test_snippet() {
        assert_eq!(snippet("short", 10), "short");
        assert_eq!(snippet("line one\nline two", 8), "line one...");
        assert_eq!(snippet("交接中心流程", 4), "交接中心...");
    }
}
