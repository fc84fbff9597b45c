use crate::app::models::{display_path, BatchSummary, Candidate, RuntimeConfig};
use std::path::Path;

pub const DOCUMENT_LANG: &str = "fr";

pub struct OutputGenerator;

impl OutputGenerator {
    /// Wraps a rendered fragment in a standalone HTML5 document.
    pub fn html_document(title: &str, body: &str) -> String {
        format!(
            "<!doctype html>
<html lang=\"{DOCUMENT_LANG}\">
<head>
  <meta charset=\"utf-8\" />
  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />
  <title>{}</title>
</head>
<body>
{}
</body>
</html>
",
            escape_html(title),
            body
        )
    }

    pub fn header(config: &RuntimeConfig) -> String {
        format!(
            "Root      : {}\nCSS       : {}\nOutput dir: {}\n",
            config.root.display(),
            config.css.display(),
            config.out_dir.display()
        )
    }

    /// One status line per candidate, paths shown relative to the root.
    pub fn status_line(
        root: &Path,
        candidate: &Candidate,
        result: &anyhow::Result<std::path::PathBuf>,
    ) -> String {
        match result {
            Ok(out_path) => {
                let shown = out_path.strip_prefix(root).unwrap_or(out_path);
                format!(
                    "[OK] {} -> {}",
                    candidate.display_name(),
                    display_path(shown)
                )
            }
            Err(err) => format!("[ERR] {}: {:#}", candidate.display_name(), err),
        }
    }

    pub fn footer(summary: &BatchSummary) -> String {
        format!("\nDone. PDFs generated: {}", summary.converted)
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
