//! Selection of the Python files to rewrite

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{trace, warn};
use regex::Regex;
use walkdir::WalkDir;

use crate::config::Settings;

/// Tool, VCS and build directories that are never descended into
const BUILTIN_EXCLUDES: &str = r"/(\.direnv|\.eggs|\.git|\.hg|\.ipynb_checkpoints|\.mypy_cache|\.nox|\.svn|\.tox|\.venv|_build|buck-out|build|dist|venv)/";

/// Expands command-line paths into the files to process
#[derive(Debug)]
pub struct FileSelector<'s> {
    settings: &'s Settings,
    builtin_excludes: Regex,
}

impl<'s> FileSelector<'s> {
    pub fn new(settings: &'s Settings) -> Result<Self> {
        let builtin_excludes =
            Regex::new(BUILTIN_EXCLUDES).context("Invalid built-in exclusion pattern")?;
        Ok(Self {
            settings,
            builtin_excludes,
        })
    }

    /// A file is taken as given; a directory is walked in file-name order
    pub fn select(&self, path: &Path) -> Vec<PathBuf> {
        if path.is_file() {
            return vec![path.to_path_buf()];
        }

        let mut selected = Vec::new();
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Failed to walk {}: {err}", path.display());
                    continue;
                }
            };
            if entry.file_type().is_file() && self.is_selected(path, entry.path()) {
                selected.push(entry.into_path());
            }
        }
        selected
    }

    fn is_selected(&self, root: &Path, path: &Path) -> bool {
        if path.extension().is_none_or(|extension| extension != "py") {
            return false;
        }

        let full = path.to_string_lossy();
        if !self.settings.files.is_match(&full) || self.settings.exclude.is_match(&full) {
            trace!("Skipping {full}: filtered by configuration");
            return false;
        }

        // Only the part below the walked root, so the root's own location never excludes
        let relative = path.strip_prefix(root).unwrap_or(path);
        let relative = format!("/{}", relative.to_string_lossy().replace('\\', "/"));
        if self.builtin_excludes.is_match(&relative) {
            trace!("Skipping {full}: inside an excluded directory");
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::config::Config;

    fn project(files: &[&str]) -> TempDir {
        let root = TempDir::new().expect("temp dir");
        for file in files {
            let path = root.path().join(file);
            fs::create_dir_all(path.parent().expect("file has a parent")).expect("create dirs");
            fs::write(path, "").expect("write file");
        }
        root
    }

    fn selected(root: &Path, config: &Config) -> Vec<String> {
        let settings = config.settings().expect("valid settings");
        FileSelector::new(&settings)
            .expect("valid selector")
            .select(root)
            .iter()
            .map(|path| {
                path.strip_prefix(root)
                    .expect("under root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_walks_python_files_in_name_order() {
        let root = project(&["b.py", "a.py", "notes.txt", "pkg/c.py", "stub.pyi"]);
        assert_eq!(
            selected(root.path(), &Config::default()),
            vec!["a.py", "b.py", "pkg/c.py"]
        );
    }

    #[test]
    fn test_builtin_excludes_skip_tool_directories() {
        let root = project(&[
            ".venv/lib/site.py",
            "build/lib/gen.py",
            "src/.git/hook.py",
            "src/builder/keep.py",
            "src/main.py",
        ]);
        assert_eq!(
            selected(root.path(), &Config::default()),
            vec!["src/builder/keep.py", "src/main.py"]
        );
    }

    #[test]
    fn test_files_and_exclude_patterns() {
        let root = project(&["pkg/a.py", "pkg/b.py", "tests/test_a.py"]);
        let config = Config {
            files: Some("/pkg/".to_owned()),
            exclude: Some("/b\\.py$".to_owned()),
            ..Config::default()
        };
        assert_eq!(selected(root.path(), &config), vec!["pkg/a.py"]);
    }

    #[test]
    fn test_file_argument_bypasses_filters() {
        let root = project(&["build/gen.txt"]);
        let file = root.path().join("build").join("gen.txt");
        let settings = Config::default().settings().expect("valid settings");
        let selector = FileSelector::new(&settings).expect("valid selector");
        assert_eq!(selector.select(&file), vec![file]);
    }
}
