use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Build PDFs from the Markdown files of a course repository"
)]
pub struct Cli {
    /// Repository root
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Output folder for PDFs, relative to the root
    #[arg(long, default_value = "out/pdfs")]
    pub out: PathBuf,

    /// CSS file for PDF styling, relative to the root
    #[arg(long, default_value = "assets/pdf.css")]
    pub css: PathBuf,

    /// Also convert the root README.md
    #[arg(long)]
    pub include_readme: bool,

    /// Use a named layout from presets.toml
    #[arg(long)]
    pub preset: Option<String>,

    /// Top-level Markdown files to convert (e.g., 'CM1.md')
    #[arg(long, num_args = 1..)]
    pub file: Option<Vec<String>>,

    /// Directories scanned non-recursively for Markdown files
    #[arg(long, num_args = 1..)]
    pub dir: Option<Vec<String>>,

    /// Directory names whose files are never converted
    #[arg(long, num_args = 1..)]
    pub exclude: Option<Vec<String>>,

    /// HTML-to-PDF engine executable
    #[arg(long, default_value = "weasyprint")]
    pub engine: String,
}
