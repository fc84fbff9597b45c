use crate::app::models::{Candidate, Layout};
use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use ignore::WalkBuilder;
use pathdiff::diff_paths;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub struct Scanner<'a> {
    root: PathBuf,
    layout: &'a Layout,
    dir_pattern: GlobMatcher,
    exclude: HashSet<&'a str>,
}

impl<'a> Scanner<'a> {
    pub fn new(root: PathBuf, layout: &'a Layout) -> Result<Self> {
        let dir_pattern = Glob::new(&layout.pattern)
            .context(format!("Invalid directory pattern: {}", layout.pattern))?
            .compile_matcher();

        Ok(Self {
            root,
            layout,
            dir_pattern,
            exclude: layout.exclude.iter().map(String::as_str).collect(),
        })
    }

    /// Lists the Markdown sources in conversion order: top-level files, then
    /// each directory's files by name, then the overview when requested.
    pub fn collect(&self, include_overview: bool) -> Vec<Candidate> {
        let mut paths: Vec<PathBuf> = self
            .layout
            .files
            .iter()
            .map(|name| self.root.join(name))
            .filter(|path| path.is_file())
            .collect();

        for dir in &self.layout.dirs {
            paths.extend(self.scan_dir(&self.root.join(dir)));
        }

        if include_overview {
            let overview = self.root.join(&self.layout.overview);
            if overview.is_file() {
                paths.push(overview);
            }
        }

        let mut seen = HashSet::new();
        paths
            .into_iter()
            .filter_map(|path| self.process_entry(path))
            .filter(|candidate| seen.insert(candidate.path.clone()))
            .collect()
    }

    fn scan_dir(&self, dir: &Path) -> Vec<PathBuf> {
        if !dir.is_dir() {
            return Vec::new();
        }

        // Depth 1 and no ignore files: a course directory lists every sheet.
        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .max_depth(Some(1))
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        for result in walker {
            match result {
                Ok(entry) => {
                    let path = entry.path();
                    if path == dir || !path.is_file() {
                        continue;
                    }
                    if entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| self.dir_pattern.is_match(name))
                    {
                        files.push(path.to_path_buf());
                    }
                }
                Err(err) => log::warn!("Error walking entry: {}", err),
            }
        }
        files
    }

    fn process_entry(&self, path: PathBuf) -> Option<Candidate> {
        let relative = diff_paths(&path, &self.root)?;

        if relative
            .components()
            .any(|c| c.as_os_str().to_str().is_some_and(|s| self.exclude.contains(s)))
        {
            return None;
        }

        if !has_markdown_extension(&path) {
            return None;
        }

        Some(Candidate { path, relative })
    }
}

fn has_markdown_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}
