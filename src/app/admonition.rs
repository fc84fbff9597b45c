//! Admonition and collapsible blocks.
//!
//! comrak has no syntax for these, so they are rewritten into raw HTML
//! wrappers before parsing. The wrapped body stays Markdown: the opening tags
//! end at a blank line, which lets comrak parse the body normally.
//!
//! ```text
//! !!! warning "Attention"
//!     Indented body.
//!
//! ???+ tip "Solution"
//!     Collapsible body, open by default.
//! ```

use crate::app::formatter::escape_html;
use regex::Regex;
use std::sync::LazyLock;

static BLOCK_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^([ \t]*)(!!!|\?\?\?\+?)[ \t]+([\w-]+(?:[ \t]+[\w-]+)*)(?:[ \t]+"(.*)")?[ \t]*$"#,
    )
    .expect("valid admonition pattern")
});
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)([-*+]|\d{1,9}[.)])([ \t]+|$)").expect("valid list item pattern")
});

const INDENT: usize = 4;

enum BlockKind {
    Admonition,
    Details { open: bool },
}

/// Rewrites every admonition and details block of `text`, recursively, and
/// leaves fenced code untouched. Blocks nested in list items keep the
/// item's indentation.
pub fn expand_blocks(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = String::with_capacity(text.len());
    let mut fence: Option<(char, usize)> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;

        if let Some(open) = fence {
            if closes_fence(line, open) {
                fence = None;
            }
            push_line(&mut out, line);
            continue;
        }
        if let Some(open) = opens_fence(line) {
            fence = Some(open);
            push_line(&mut out, line);
            continue;
        }

        let Some(caps) = BLOCK_START.captures(line) else {
            push_line(&mut out, line);
            continue;
        };

        let margin = indent_width(&caps[1]);
        if margin >= INDENT && !inside_list_item(&lines[..i - 1], margin) {
            // Indented code, not a block.
            push_line(&mut out, line);
            continue;
        }

        let kind = match &caps[2] {
            "!!!" => BlockKind::Admonition,
            marker => BlockKind::Details {
                open: marker.ends_with('+'),
            },
        };
        let classes = caps[3].split_whitespace().collect::<Vec<_>>().join(" ");
        let title = match caps.get(4) {
            Some(quoted) => quoted.as_str().to_string(),
            None => default_title(&classes),
        };

        let start = i;
        while i < lines.len()
            && (lines[i].trim().is_empty() || indent_width(lines[i]) >= margin + INDENT)
        {
            i += 1;
        }
        let mut end = i;
        while end > start && lines[end - 1].trim().is_empty() {
            end -= 1;
        }
        i = end;

        let body = lines[start..end]
            .iter()
            .map(|l| dedent(l, margin + INDENT))
            .collect::<Vec<_>>()
            .join("\n");

        let mut block = String::new();
        render_block(&mut block, &kind, &classes, &title, &expand_blocks(&body));
        push_indented(&mut out, &block, margin);
    }

    out
}

/// True when the nearest less-indented line above is a list item whose
/// content starts at or before `margin`.
fn inside_list_item(previous: &[&str], margin: usize) -> bool {
    let Some(parent) = previous
        .iter()
        .rev()
        .find(|l| !l.trim().is_empty() && indent_width(l) < margin)
    else {
        return false;
    };
    LIST_ITEM
        .captures(parent)
        .is_some_and(|caps| indent_width(&caps[1]) + caps[2].len() + 1 <= margin)
}

fn push_indented(out: &mut String, block: &str, margin: usize) {
    let pad = " ".repeat(margin);
    for line in block.lines() {
        if line.is_empty() {
            push_line(out, line);
        } else {
            out.push_str(&pad);
            push_line(out, line);
        }
    }
}

fn render_block(out: &mut String, kind: &BlockKind, classes: &str, title: &str, body: &str) {
    let classes = escape_html(classes);
    match kind {
        BlockKind::Admonition => {
            push_line(out, &format!("<div class=\"admonition {classes}\">"));
            if !title.is_empty() {
                push_line(
                    out,
                    &format!("<p class=\"admonition-title\">{}</p>", escape_html(title)),
                );
            }
        }
        BlockKind::Details { open } => {
            let open = if *open { " open" } else { "" };
            push_line(out, &format!("<details class=\"{classes}\"{open}>"));
            push_line(out, &format!("<summary>{}</summary>", escape_html(title)));
        }
    }
    push_line(out, "");
    if !body.is_empty() {
        push_line(out, body.trim_end_matches('\n'));
        push_line(out, "");
    }
    match kind {
        BlockKind::Admonition => push_line(out, "</div>"),
        BlockKind::Details { .. } => push_line(out, "</details>"),
    }
    push_line(out, "");
}

fn default_title(classes: &str) -> String {
    let first = classes.split(' ').next().unwrap_or_default();
    let mut chars = first.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += INDENT - width % INDENT,
            _ => break,
        }
    }
    width
}

/// Removes `columns` columns of leading whitespace, expanding tabs.
fn dedent(line: &str, columns: usize) -> String {
    let mut width = 0;
    for (idx, c) in line.char_indices() {
        if width >= columns {
            return line[idx..].to_string();
        }
        width += match c {
            ' ' => 1,
            '\t' => INDENT - width % INDENT,
            _ => return line[idx..].to_string(),
        };
        if width > columns {
            return format!("{}{}", " ".repeat(width - columns), &line[idx + 1..]);
        }
    }
    String::new()
}

fn opens_fence(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start_matches([' ', '\t']);
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    (len >= 3).then_some((marker, len))
}

fn closes_fence(line: &str, (marker, len): (char, usize)) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= len && trimmed.chars().all(|c| c == marker)
}
