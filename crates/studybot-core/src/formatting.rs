//! Telegram HTML helpers.

use crate::domain::UserId;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Inline mention that pings the user.
pub fn mention_html(user_id: UserId, display_name: &str) -> String {
    format!(
        r#"<a href="tg://user?id={}">{}</a>"#,
        user_id.0,
        escape_html(display_name)
    )
}

/// Split a reply into chunks of at most `limit` bytes.
///
/// Replies are built so that every tag opened on a line is closed on the same
/// line, which makes line boundaries safe split points. A single line longer
/// than `limit` is cut at a char boundary.
pub fn split_lines(html: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if html.len() <= limit {
        return vec![html.to_string()];
    }

    let mut out = Vec::new();
    let mut chunk = String::new();
    for line in html.split('\n') {
        let sep = usize::from(!chunk.is_empty());
        if chunk.len() + sep + line.len() <= limit {
            if sep == 1 {
                chunk.push('\n');
            }
            chunk.push_str(line);
            continue;
        }

        if !chunk.is_empty() {
            out.push(std::mem::take(&mut chunk));
        }

        let mut rest = line;
        while rest.len() > limit {
            let (head, tail) = split_utf8_prefix(rest, limit);
            out.push(head.to_string());
            rest = tail;
        }
        chunk.push_str(rest);
    }

    if !chunk.trim().is_empty() {
        out.push(chunk);
    }
    out
}

fn split_utf8_prefix(s: &str, max_bytes: usize) -> (&str, &str) {
    let mut idx = max_bytes.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    if idx == 0 {
        // A single char wider than the limit; emit it anyway to make progress.
        idx = s.chars().next().map(char::len_utf8).unwrap_or(s.len());
    }
    s.split_at(idx)
}
