// Declare modules
pub mod admonition;
pub mod cli;
pub mod config;
pub mod formatter;
pub mod markdown;
pub mod models;
pub mod pdf;
pub mod renderer;
pub mod scanner;
pub mod slug;

use anyhow::{bail, Result};
use clap::Parser;
use std::collections::HashMap;

use self::cli::Cli;
use self::config::{load_presets_file, presets_path, resolve_config};
use self::formatter::OutputGenerator;
use self::markdown::{ComrakRenderer, MarkdownRenderer};
use self::models::{BatchSummary, RuntimeConfig};
use self::pdf::{PdfEngine, WeasyPrint};
use self::renderer::DocumentRenderer;
use self::scanner::Scanner;

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<BatchSummary> {
    // 1. Parse Args
    let args = Cli::parse();

    // 2. Load presets
    let presets = match presets_path() {
        Some(path) => load_presets_file(&path)?,
        None => HashMap::new(),
    };

    // 3. Resolve Configuration
    let config = resolve_config(args, &presets)?;

    // 4. Convert with the real collaborators
    let engine = WeasyPrint::new(config.engine.clone());
    build(&config, ComrakRenderer, engine)
}

/// Checks the stylesheet, collects candidates and converts them, printing
/// one status line per file.
pub fn build<M, P>(config: &RuntimeConfig, markdown: M, pdf: P) -> Result<BatchSummary>
where
    M: MarkdownRenderer,
    P: PdfEngine,
{
    if !config.css.exists() {
        bail!("CSS not found: {}", config.css.display());
    }

    let scanner = Scanner::new(config.root.clone(), &config.layout)?;

    println!("{}", OutputGenerator::header(config));

    let candidates = scanner.collect(config.include_overview);
    if candidates.is_empty() {
        log::warn!("No Markdown files found under {}", config.root.display());
    }

    let renderer = DocumentRenderer::new(config, markdown, pdf);
    let summary = renderer.run_batch(candidates, |candidate, result| {
        println!(
            "{}",
            OutputGenerator::status_line(&config.root, candidate, result)
        );
    });

    println!("{}", OutputGenerator::footer(&summary));

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::Layout;
    use crate::app::pdf::PdfError;
    use std::cell::Cell;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[derive(Default)]
    struct CountingPdf {
        calls: Cell<usize>,
    }

    impl PdfEngine for &CountingPdf {
        fn render(&self, _: &str, _: &Path, _: &Path) -> Result<Vec<u8>, PdfError> {
            self.calls.set(self.calls.get() + 1);
            Ok(b"%PDF".to_vec())
        }
    }

    fn course(root: &Path) {
        for rel in ["CM1.md", "README.md", "cm1-td/td1.md", "assets/pdf.css"] {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "# Titre\n").unwrap();
        }
    }

    fn config(root: &Path, include_overview: bool) -> RuntimeConfig {
        RuntimeConfig {
            root: root.to_path_buf(),
            out_dir: root.join("out/pdfs"),
            css: root.join("assets/pdf.css"),
            include_overview,
            engine: "weasyprint".into(),
            layout: Layout::default(),
        }
    }

    #[test]
    fn missing_stylesheet_converts_nothing() {
        let tmp = TempDir::new().unwrap();
        course(tmp.path());
        fs::remove_file(tmp.path().join("assets/pdf.css")).unwrap();
        let pdf = CountingPdf::default();

        let err = build(&config(tmp.path(), false), ComrakRenderer, &pdf).unwrap_err();

        assert!(err.to_string().starts_with("CSS not found: "));
        assert_eq!(pdf.calls.get(), 0);
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn invalid_directory_pattern_converts_nothing() {
        let tmp = TempDir::new().unwrap();
        course(tmp.path());
        let mut config = config(tmp.path(), false);
        config.layout.pattern = "[".into();
        let pdf = CountingPdf::default();

        let err = build(&config, ComrakRenderer, &pdf).unwrap_err();

        assert!(err.to_string().starts_with("Invalid directory pattern: ["));
        assert_eq!(pdf.calls.get(), 0);
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn converts_course_layout() {
        let tmp = TempDir::new().unwrap();
        course(tmp.path());
        let pdf = CountingPdf::default();

        let summary = build(&config(tmp.path(), false), ComrakRenderer, &pdf).unwrap();

        assert_eq!(summary.converted, 2);
        assert_eq!(pdf.calls.get(), 2);
        assert!(tmp.path().join("out/pdfs/CM1.pdf").is_file());
        assert!(tmp.path().join("out/pdfs/cm1-td_td1.pdf").is_file());
    }

    #[test]
    fn include_readme_adds_one_document_last() {
        let tmp = TempDir::new().unwrap();
        course(tmp.path());
        let pdf = CountingPdf::default();

        let without = build(&config(tmp.path(), false), ComrakRenderer, &pdf).unwrap();
        let with = build(&config(tmp.path(), true), ComrakRenderer, &pdf).unwrap();

        assert_eq!(with.results.len(), without.results.len() + 1);
        let (last, result) = with.results.last().unwrap();
        assert_eq!(last.display_name(), "README.md");
        assert!(result.is_ok());
    }
}
