use std::path::{Path, PathBuf};

pub const DEFAULT_EXCLUDE_DIRS: [&str; 6] = ["temp", "tmp", ".git", ".venv", "out", "__pycache__"];

/// Which files of a course repository are considered for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Files directly under the root, in conversion order.
    pub files: Vec<String>,
    /// Directories whose direct children are scanned.
    pub dirs: Vec<String>,
    /// Glob matched against file names inside `dirs`.
    pub pattern: String,
    /// Root-level overview document, converted only on request.
    pub overview: String,
    pub exclude: Vec<String>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            files: vec!["CM1.md".into(), "CM2.md".into(), "CM3.md".into()],
            dirs: vec!["cm1-td".into(), "cm2-td".into(), "cm3-td".into()],
            pattern: "*.md".into(),
            overview: "README.md".into(),
            exclude: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Represents the final configuration after merging presets and CLI args.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root: PathBuf,
    pub out_dir: PathBuf,
    pub css: PathBuf,
    pub include_overview: bool,
    pub engine: String,
    pub layout: Layout,
}

/// A Markdown file selected for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub relative: PathBuf,
}

impl Candidate {
    /// Root-relative path with forward slashes, used for titles and reports.
    pub fn display_name(&self) -> String {
        display_path(&self.relative)
    }
}

pub fn display_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Outcome of one batch run, in candidate order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub results: Vec<(Candidate, anyhow::Result<PathBuf>)>,
    pub converted: usize,
}

impl BatchSummary {
    pub fn push(&mut self, candidate: Candidate, result: anyhow::Result<PathBuf>) {
        if result.is_ok() {
            self.converted += 1;
        }
        self.results.push((candidate, result));
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.converted
    }
}
