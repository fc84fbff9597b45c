use crate::app::admonition::expand_blocks;
use crate::app::formatter::escape_html;
use anyhow::Result;
use comrak::nodes::{AstNode, NodeValue};
use comrak::{markdown_to_html, parse_document, Anchorizer, Arena, Options};
use regex::Regex;
use std::sync::LazyLock;

const TOC_MARKER: &str = "[TOC]";

static TASK_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<li([^>]*)>(<p>)?(<input type="checkbox"[^>]*/>)"#)
        .expect("valid task item pattern")
});

/// Text-to-HTML collaborator. `title` names the document being rendered;
/// implementations return a body fragment, not a full document.
pub trait MarkdownRenderer {
    fn render(&self, text: &str, title: &str) -> Result<String>;
}

/// GitHub-flavoured Markdown through comrak, plus admonitions, details
/// blocks and a `[TOC]` marker.
///
/// Code blocks keep their info string as a `language-*` class and are not
/// highlighted; `mermaid` and other diagram fences stay literal code.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComrakRenderer;

impl MarkdownRenderer for ComrakRenderer {
    fn render(&self, text: &str, title: &str) -> Result<String> {
        log::debug!("Rendering Markdown for {}", title);
        let mut options = Options::default();
        configure(&mut options);

        let source = expand_blocks(text);
        let html = style_task_items(&markdown_to_html(&source, &options));

        if !source.contains(TOC_MARKER) {
            return Ok(html);
        }

        let arena = Arena::new();
        let root = parse_document(&arena, &source, &options);
        let toc = table_of_contents(&collect_headings(root));
        Ok(html.replace(&format!("<p>{TOC_MARKER}</p>"), toc.trim_end()))
    }
}

fn configure(options: &mut Options) {
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.extension.autolink = true;
    options.extension.footnotes = true;
    options.extension.description_lists = true;
    options.extension.header_ids = Some(String::new());
    options.parse.smart = true;
    // Admonitions, details blocks and inline HTML from the course files.
    options.render.unsafe_ = true;
}

/// Wraps task checkboxes in the `task-list-*` markup the stylesheet targets.
fn style_task_items(html: &str) -> String {
    TASK_ITEM
        .replace_all(
            html,
            "<li class=\"task-list-item\"$1>$2<label class=\"task-list-control\">$3\
             <span class=\"task-list-indicator\"></span></label>",
        )
        .into_owned()
}

struct Heading {
    level: u8,
    anchor: String,
    text: String,
}

fn collect_headings<'a>(root: &'a AstNode<'a>) -> Vec<Heading> {
    // Same anchor sequence as comrak's own header ids, in document order.
    let mut anchorizer = Anchorizer::new();
    let mut headings = Vec::new();

    for node in root.descendants() {
        let level = match &node.data.borrow().value {
            NodeValue::Heading(heading) => heading.level,
            _ => continue,
        };
        let text = heading_text(node);
        headings.push(Heading {
            level,
            anchor: anchorizer.anchorize(text.clone()),
            text,
        });
    }
    headings
}

fn heading_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.descendants() {
        match &child.data.borrow().value {
            NodeValue::Text(literal) => text.push_str(literal),
            NodeValue::Code(code) => text.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

fn table_of_contents(headings: &[Heading]) -> String {
    let mut out = String::from("<div class=\"toc\">\n");
    let mut levels: Vec<u8> = Vec::new();

    for heading in headings {
        match levels.last().copied() {
            None => {
                out.push_str("<ul>\n");
                levels.push(heading.level);
            }
            Some(current) if heading.level > current => {
                out.push_str("\n<ul>\n");
                levels.push(heading.level);
            }
            Some(_) => {
                out.push_str("</li>\n");
                while levels.len() > 1 && levels[levels.len() - 2] >= heading.level {
                    levels.pop();
                    out.push_str("</ul>\n</li>\n");
                }
                // Skipped levels stay in the list they were opened in.
                if let Some(current) = levels.last_mut() {
                    *current = heading.level;
                }
            }
        }
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            escape_html(&heading.anchor),
            escape_html(&heading.text)
        ));
    }

    if !levels.is_empty() {
        out.push_str("</li>\n");
        for _ in 1..levels.len() {
            out.push_str("</ul>\n</li>\n");
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</div>\n");
    out
}
