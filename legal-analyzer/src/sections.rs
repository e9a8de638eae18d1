//! Best-effort section splitter for numbered legal text.
//!
//! Recognized headings start a line with one of:
//! `第…条`, a Chinese numeral + `、`/`．`/`.`, an Arabic numeral + the same,
//! a parenthesized numeral (`（一）`, `(3)`), or a Latin word + `.`.

use std::sync::LazyLock;

use regex::Regex;

use crate::structs::compliance::Section;

/// Title of the text before the first heading.
pub const INTRO_TITLE: &str = "引言或未明确章节";
/// Title used when no heading is found at all.
pub const WHOLE_TEXT_TITLE: &str = "全文";

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t\u{3000}]*(?:第[一二三四五六七八九十百千万零〇\d]+条|[一二三四五六七八九十百千万]+[、．.]|\d+[、．.]|[（(][一二三四五六七八九十百千万\d]+[）)]|[A-Za-z]+\.)",
    )
    .expect("section heading regex")
});

/// Splits `text` into ordered sections.
///
/// - Each heading line becomes a title; the text up to the next heading is
///   its content.
/// - Non-blank text before the first heading is an introduction section.
/// - Without any heading the whole (trimmed) text is one section.
/// - Blank input yields no sections.
///
/// Repeated titles are kept in order. Never fails.
pub fn split_into_sections(text: &str) -> Vec<Section> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let starts: Vec<usize> = HEADING.find_iter(text).map(|m| m.start()).collect();
    if starts.is_empty() {
        return vec![Section {
            title: WHOLE_TEXT_TITLE.to_string(),
            content: text.trim().to_string(),
        }];
    }

    let mut sections = Vec::with_capacity(starts.len() + 1);
    let intro = text[..starts[0]].trim();
    if !intro.is_empty() {
        sections.push(Section {
            title: INTRO_TITLE.to_string(),
            content: intro.to_string(),
        });
    }

    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        let block = &text[start..end];
        let (title, content) = match block.find('\n') {
            Some(nl) => (&block[..nl], &block[nl + 1..]),
            None => (block, ""),
        };
        sections.push(Section {
            title: title.trim().to_string(),
            content: content.trim().to_string(),
        });
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(sections: &[Section]) -> Vec<&str> {
        sections.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn recognizes_all_marker_styles() {
        let text = "前言内容\n第一条 总则\n内容一\n二、定义\n内容二\n3. 范围\n（四）责任\n(5) 其他\nA. 附录\n";
        let s = split_into_sections(text);
        assert_eq!(
            titles(&s),
            vec![INTRO_TITLE, "第一条 总则", "二、定义", "3. 范围", "（四）责任", "(5) 其他", "A. 附录"]
        );
        assert_eq!(s[0].content, "前言内容");
        assert_eq!(s[1].content, "内容一");
        assert_eq!(s[3].content, "");
    }

    #[test]
    fn markers_must_start_a_line() {
        let s = split_into_sections("本协议依据第一条订立。\n双方同意。");
        assert_eq!(titles(&s), vec![WHOLE_TEXT_TITLE]);
        assert_eq!(s[0].content, "本协议依据第一条订立。\n双方同意。");
    }

    #[test]
    fn leading_heading_has_no_intro() {
        let s = split_into_sections("  1、收集信息\n我们收集姓名。");
        assert_eq!(titles(&s), vec!["1、收集信息"]);
        assert_eq!(s[0].content, "我们收集姓名。");
    }

    #[test]
    fn duplicate_titles_are_kept_in_order() {
        let s = split_into_sections("1. 条款\n甲\n1. 条款\n乙");
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].content, "甲");
        assert_eq!(s[1].content, "乙");
    }

    #[test]
    fn blank_input_has_no_sections() {
        assert!(split_into_sections("").is_empty());
        assert!(split_into_sections(" \n\t").is_empty());
    }
}
