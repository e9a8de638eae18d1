//! Sentence splitting for Chinese/Latin legal text.

/// Characters that close a sentence and stay attached to it.
pub const TERMINALS: &[char] = &['。', '！', '？', '!', '?', '；', ';', '…'];

/// Splits `text` into trimmed sentences, keeping their terminal punctuation.
///
/// Line breaks also end a sentence (headings, list items); the break itself
/// is dropped. Blank fragments are discarded.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();

    for ch in text.chars() {
        if ch == '\n' || ch == '\r' {
            flush(&mut buf, &mut out);
            continue;
        }
        buf.push(ch);
        if TERMINALS.contains(&ch) {
            flush(&mut buf, &mut out);
        }
    }
    flush(&mut buf, &mut out);
    out
}

fn flush(buf: &mut String, out: &mut Vec<String>) {
    let s = buf.trim();
    // A lone terminal ("。" after "？") is not a sentence.
    if !s.is_empty() && !s.chars().all(|c| TERMINALS.contains(&c)) {
        out.push(s.to_string());
    }
    buf.clear();
}

/// Appends `。` unless the sentence already ends with terminal punctuation.
pub fn ensure_terminated(sentence: &str) -> String {
    let s = sentence.trim_end();
    match s.chars().last() {
        Some(c) if TERMINALS.contains(&c) => s.to_string(),
        _ => format!("{s}。"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminals_and_newlines() {
        let s = split_sentences("第一条 总则\n本协议适用于用户。用户有权查询！是否同意？");
        assert_eq!(
            s,
            vec!["第一条 总则", "本协议适用于用户。", "用户有权查询！", "是否同意？"]
        );
    }

    #[test]
    fn repeated_terminals_do_not_create_empty_sentences() {
        assert_eq!(split_sentences("真的吗？！"), vec!["真的吗？"]);
        assert!(split_sentences("  \n\n ").is_empty());
    }

    #[test]
    fn termination_is_synthesized_once() {
        assert_eq!(ensure_terminated("第一条 总则"), "第一条 总则。");
        assert_eq!(ensure_terminated("已终止。"), "已终止。");
    }
}
