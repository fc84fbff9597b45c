use crate::app::formatter::OutputGenerator;
use crate::app::markdown::MarkdownRenderer;
use crate::app::models::{BatchSummary, Candidate, RuntimeConfig};
use crate::app::pdf::PdfEngine;
use crate::app::slug::output_file_name;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Converts candidates one at a time: Markdown to HTML, HTML to PDF.
pub struct DocumentRenderer<'a, M, P> {
    config: &'a RuntimeConfig,
    markdown: M,
    pdf: P,
}

impl<'a, M: MarkdownRenderer, P: PdfEngine> DocumentRenderer<'a, M, P> {
    pub fn new(config: &'a RuntimeConfig, markdown: M, pdf: P) -> Self {
        Self {
            config,
            markdown,
            pdf,
        }
    }

    pub fn destination(&self, candidate: &Candidate) -> PathBuf {
        self.config
            .out_dir
            .join(output_file_name(&candidate.relative))
    }

    /// Converts a single candidate and returns the written PDF path.
    pub fn convert(&self, candidate: &Candidate) -> Result<PathBuf> {
        let out_path = self.destination(candidate);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let title = candidate.display_name();
        let text = fs::read_to_string(&candidate.path)
            .with_context(|| format!("failed to read {}", title))?;

        let fragment = self
            .markdown
            .render(&text, &title)
            .context("failed to render Markdown")?;
        let html = OutputGenerator::html_document(&title, &fragment);

        let base_dir = candidate.path.parent().unwrap_or(&self.config.root);
        let pdf = self.pdf.render(&html, base_dir, &self.config.css)?;

        fs::write(&out_path, pdf)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        Ok(out_path)
    }

    /// Converts every candidate in order. Failures are recorded per file and
    /// never stop the batch; `report` sees each outcome as it happens.
    pub fn run_batch<F>(&self, candidates: Vec<Candidate>, mut report: F) -> BatchSummary
    where
        F: FnMut(&Candidate, &Result<PathBuf>),
    {
        let mut written: HashMap<PathBuf, String> = HashMap::new();
        let mut summary = BatchSummary::default();

        for candidate in candidates {
            let dest = self.destination(&candidate);
            let result = match written.get(&dest) {
                Some(first) => Err(anyhow!(
                    "output {} already written by {}",
                    dest.file_name().unwrap_or_default().to_string_lossy(),
                    first
                )),
                None => self.convert(&candidate),
            };

            if result.is_ok() {
                written.insert(dest, candidate.display_name());
            }
            report(&candidate, &result);
            summary.push(candidate, result);
        }

        summary
    }
}
