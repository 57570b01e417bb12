/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - UNIFEED Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub fn looks_like_html(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() {
        return false;
    }
    t.contains('<') && t.contains('>')
}

/// Turns rendered note content back into scannable plain text: tags removed,
/// `<br>`/`</p>` as newlines, the entities our renderer emits decoded.
/// Not a sanitizer.
pub fn strip_html(text: &str) -> String {
    if !looks_like_html(text) {
        return unescape_entities(text.trim());
    }
    let mut out = String::with_capacity(text.len());
    let mut tag = String::new();
    let mut in_tag = false;
    for ch in text.chars() {
        if in_tag {
            if ch == '>' {
                in_tag = false;
                let name = tag
                    .trim_start_matches('/')
                    .split_whitespace()
                    .next()
                    .unwrap_or("")
                    .to_ascii_lowercase();
                if (name == "br" || name == "p") && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                tag.clear();
            } else {
                tag.push(ch);
            }
        } else if ch == '<' {
            in_tag = true;
        } else {
            out.push(ch);
        }
    }
    unescape_entities(out.trim())
}

fn unescape_entities(text: &str) -> String {
    // &amp; last, so double-escaped input stays single-escaped.
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Denormalized searchable text for a note: name and content stripped,
/// lower-cased, whitespace collapsed. Equal output means equal content as far
/// as duplicate linking is concerned.
pub fn to_search_text(name: &str, content: &str) -> String {
    let mut joined = String::new();
    for part in [name, content] {
        let stripped = strip_html(part);
        if stripped.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(&stripped);
    }
    joined
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
