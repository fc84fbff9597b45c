use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static UNSAFE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid slug pattern"));
static UNDERSCORE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("valid underscore pattern"));

const FALLBACK_SLUG: &str = "document";

/// Turns a root-relative path (extension already stripped) into a flat,
/// filesystem-safe name: `cm1-td/td1` becomes `cm1-td_td1`.
pub fn slugify(rel_path: &Path) -> String {
    let joined = rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("_");

    let safe = UNSAFE_RUN.replace_all(&joined, "_");
    let collapsed = UNDERSCORE_RUN.replace_all(&safe, "_");
    let trimmed = collapsed.trim_matches('_');

    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// PDF file name for a root-relative Markdown path.
pub fn output_file_name(rel_path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.pdf", slugify(&rel_path.with_extension(""))))
}
