// src/core/sanitize.rs

/// Collapse runs of whitespace to one space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Remove every closed `[ ... ]` group (footnote markers like `[1]`, `[citation needed]`).
/// Shortest match per group, no nesting. An unclosed `[` is kept as text.
pub fn strip_citations(s: &str) -> String {
    strip_groups(s, '[', ']', false)
}

/// Remove every closed `( ... )` group together with the whitespace before it.
/// `"Esch (Haaren)"` → `"Esch"`.
pub fn strip_parentheticals(s: &str) -> String {
    strip_groups(s, '(', ')', true)
}

fn strip_groups(s: &str, open: char, close: char, eat_leading_ws: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(o) = rest.find(open) {
        let Some(c) = rest[o..].find(close) else { break };
        let mut head = &rest[..o];
        if eat_leading_ws {
            head = head.trim_end();
        }
        out.push_str(head);
        rest = &rest[o + c + close.len_utf8()..];
    }
    out.push_str(rest);
    normalize_ws(&out)
}

/// Trim the punctuation that scraped names tend to carry at either end.
pub fn trim_name_punct(s: &str) -> &str {
    s.trim_matches(|c: char| c == ' ' || c == ',' || c == '.' || c == '-')
}

/// Character (not byte) length; names are compared against small minimums.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
