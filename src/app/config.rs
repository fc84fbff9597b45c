use crate::app::cli::Cli;
use crate::app::models::{Layout, RuntimeConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Debug)]
struct PresetsFile {
    #[serde(flatten)]
    presets: HashMap<String, PresetConfig>,
}

/// A named layout override from `presets.toml`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PresetConfig {
    pub files: Option<Vec<String>>,
    pub dirs: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub pattern: Option<String>,
    pub overview: Option<String>,
}

pub fn presets_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".config")
            .join("course_pdf")
            .join("presets.toml")
    })
}

/// Reads the presets file; a missing file means no presets.
pub fn load_presets_file(path: &Path) -> Result<HashMap<String, PresetConfig>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(path)
        .context(format!("Failed to read config at {:?}", path))?;
    parse_presets(&content)
}

fn parse_presets(content: &str) -> Result<HashMap<String, PresetConfig>> {
    let parsed: PresetsFile = toml::from_str(content).context("Failed to parse presets.toml")?;
    Ok(parsed.presets)
}

fn merge_vecs(preset_vec: Option<Vec<String>>, cli_vec: Option<Vec<String>>) -> Vec<String> {
    let mut combined = preset_vec.unwrap_or_default();
    if let Some(mut cli_items) = cli_vec {
        combined.append(&mut cli_items);
    }
    // Deduplicate while keeping order
    let mut seen = std::collections::HashSet::new();
    combined.retain(|item| seen.insert(item.clone()));
    combined
}

/// Builds the layout: preset and CLI lists are concatenated, the default
/// course layout fills whatever both leave empty, and the default exclusion
/// set is always kept.
fn resolve_layout(preset: PresetConfig, cli: &Cli) -> Layout {
    let default = Layout::default();

    let mut files = merge_vecs(preset.files, cli.file.clone());
    let mut dirs = merge_vecs(preset.dirs, cli.dir.clone());
    if files.is_empty() && dirs.is_empty() {
        files = default.files;
        dirs = default.dirs;
    }

    Layout {
        files,
        dirs,
        pattern: preset.pattern.unwrap_or(default.pattern),
        overview: preset.overview.unwrap_or(default.overview),
        exclude: merge_vecs(
            Some(default.exclude),
            Some(merge_vecs(preset.exclude, cli.exclude.clone())),
        ),
    }
}

pub fn resolve_config(cli: Cli, presets: &HashMap<String, PresetConfig>) -> Result<RuntimeConfig> {
    let root = cli
        .root
        .canonicalize()
        .context(format!("Repository root not found: {}", cli.root.display()))?;

    // Determine preset to use: CLI flag > root folder name > None
    let project_name = root.file_name().and_then(|n| n.to_str());
    let preset_key = cli.preset.as_deref().or(project_name);
    if let Some(name) = cli.preset.as_deref() {
        if !presets.contains_key(name) {
            log::warn!("Preset '{}' not found, using the default layout", name);
        }
    }
    let preset = preset_key
        .and_then(|k| presets.get(k))
        .cloned()
        .unwrap_or_default();

    let config = RuntimeConfig {
        out_dir: root.join(&cli.out),
        css: root.join(&cli.css),
        include_overview: cli.include_readme,
        engine: cli.engine.clone(),
        layout: resolve_layout(preset, &cli),
        root,
    };
    log::debug!("Resolved configuration: {:?}", config);

    Ok(config)
}
