//! Configuration from `pyproject.toml` and the command line
//!
//! Values come from three layers, highest precedence first: command-line
//! flags, the `[tool.auto-walrus]` table of the nearest `pyproject.toml`
//! above the inputs, and built-in defaults.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::debug;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

/// Line length used when neither the command line nor `pyproject.toml` sets one
pub const DEFAULT_LINE_LENGTH: usize = 88;

/// Include pattern that matches every path
pub const DEFAULT_FILES: &str = "";

/// Exclude pattern that matches no path
pub const DEFAULT_EXCLUDE: &str = "^$";

/// One layer of settings; unset values defer to the layer below
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(alias = "line_length")]
    pub line_length: Option<usize>,
    pub files: Option<String>,
    pub exclude: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PyProject {
    tool: Option<Tools>,
}

#[derive(Debug, Default, Deserialize)]
struct Tools {
    #[serde(rename = "auto-walrus", alias = "auto_walrus")]
    auto_walrus: Option<Config>,
}

impl Config {
    /// Whether no value is set
    pub fn is_empty(&self) -> bool {
        self.line_length.is_none() && self.files.is_none() && self.exclude.is_none()
    }

    /// Find the configuration governing `paths`.
    ///
    /// Starts at the deepest directory containing every path and walks
    /// upward; the first `pyproject.toml` with a non-empty
    /// `[tool.auto-walrus]` table wins.
    pub fn discover(paths: &[PathBuf]) -> Result<Option<(PathBuf, Self)>> {
        let Some(ancestor) = common_ancestor(paths) else {
            return Ok(None);
        };
        let root = if ancestor.is_file() {
            ancestor.parent().map(Path::to_path_buf).unwrap_or(ancestor)
        } else {
            ancestor
        };

        for directory in root.ancestors() {
            let candidate = directory.join("pyproject.toml");
            if !candidate.is_file() {
                continue;
            }
            if let Some(config) = Self::from_pyproject(&candidate)? {
                debug!("Using configuration from {}", candidate.display());
                return Ok(Some((candidate, config)));
            }
            debug!("No [tool.auto-walrus] settings in {}", candidate.display());
        }

        Ok(None)
    }

    /// Read the `[tool.auto-walrus]` table of a `pyproject.toml`, if it sets anything
    pub fn from_pyproject(path: &Path) -> Result<Option<Self>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse_pyproject(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn parse_pyproject(content: &str) -> Result<Option<Self>> {
        let pyproject: PyProject = toml::from_str(content)?;
        Ok(pyproject
            .tool
            .and_then(|tools| tools.auto_walrus)
            .filter(|config| !config.is_empty()))
    }

    /// Layer `overrides` on top of `self`
    #[must_use]
    pub fn merged(self, overrides: Self) -> Self {
        Self {
            line_length: overrides.line_length.or(self.line_length),
            files: overrides.files.or(self.files),
            exclude: overrides.exclude.or(self.exclude),
        }
    }

    /// Fill in defaults and compile the patterns
    pub fn settings(&self) -> Result<Settings> {
        Ok(Settings {
            line_length: self.line_length.unwrap_or(DEFAULT_LINE_LENGTH),
            files: compile("files", self.files.as_deref().unwrap_or(DEFAULT_FILES))?,
            exclude: compile("exclude", self.exclude.as_deref().unwrap_or(DEFAULT_EXCLUDE))?,
        })
    }
}

/// Fully resolved settings for a run
#[derive(Debug, Clone)]
pub struct Settings {
    pub line_length: usize,
    /// Files found by walking a directory are kept only if they match
    pub files: Regex,
    /// Files found by walking a directory are dropped if they match
    pub exclude: Regex,
}

/// Patterns are verbose: whitespace and `#` comments are ignored
fn compile(key: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .ignore_whitespace(true)
        .build()
        .with_context(|| format!("Invalid regex for `{key}`: {pattern}"))
}

fn common_ancestor(paths: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = paths.split_first()?;
    let mut ancestor = first.clone();
    for path in rest {
        while !path.starts_with(&ancestor) {
            if !ancestor.pop() {
                return None;
            }
        }
    }
    Some(ancestor)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_accepts_kebab_and_snake_case_keys() {
        let kebab = Config::parse_pyproject("[tool.auto-walrus]\nline-length = 100\n")
            .expect("valid toml");
        let snake = Config::parse_pyproject("[tool.auto-walrus]\nline_length = 100\n")
            .expect("valid toml");
        assert_eq!(kebab, snake);
        assert_eq!(kebab.and_then(|config| config.line_length), Some(100));
    }

    #[test]
    fn test_missing_or_empty_table_is_none() {
        assert_eq!(Config::parse_pyproject("\n").expect("valid toml"), None);
        assert_eq!(
            Config::parse_pyproject("[tool.black]\nline-length = 79\n").expect("valid toml"),
            None
        );
        assert_eq!(
            Config::parse_pyproject("[tool.auto-walrus]\n").expect("valid toml"),
            None
        );
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::parse_pyproject("[tool.auto-walrus\n").is_err());
    }

    #[test]
    fn test_command_line_overrides_file() {
        let file = Config {
            line_length: Some(100),
            exclude: Some("/a".to_owned()),
            files: None,
        };
        let command_line = Config {
            exclude: Some("/b".to_owned()),
            ..Config::default()
        };
        let merged = file.merged(command_line);
        assert_eq!(merged.line_length, Some(100));
        assert_eq!(merged.exclude.as_deref(), Some("/b"));
        assert_eq!(merged.files, None);
    }

    #[test]
    fn test_settings_use_defaults_and_verbose_patterns() {
        let settings = Config {
            exclude: Some(r"
                /build/   # generated
              | \.pyi$
            ".to_owned()),
            ..Config::default()
        }
        .settings()
        .expect("valid patterns");

        assert_eq!(settings.line_length, DEFAULT_LINE_LENGTH);
        assert!(settings.files.is_match("/project/pkg/module.py"));
        assert!(settings.exclude.is_match("/project/build/module.py"));
        assert!(!settings.exclude.is_match("/project/pkg/module.py"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let error = Config {
            files: Some("(".to_owned()),
            ..Config::default()
        }
        .settings()
        .expect_err("unbalanced group");
        assert!(error.to_string().contains("`files`"));
    }

    #[test]
    fn test_discover_walks_up_from_common_ancestor() {
        let root = TempDir::new().expect("temp dir");
        let nested = root.path().join("pkg").join("sub");
        fs::create_dir_all(&nested).expect("create dirs");
        fs::write(
            root.path().join("pyproject.toml"),
            "[tool.auto-walrus]\nline-length = 120\n",
        )
        .expect("write pyproject");
        // An empty table closer to the inputs does not stop the search
        fs::write(root.path().join("pkg").join("pyproject.toml"), "[tool.auto-walrus]\n")
            .expect("write pyproject");
        let module = nested.join("module.py");
        fs::write(&module, "").expect("write module");

        let paths = vec![module, root.path().join("pkg").join("other.py")];
        let (found, config) = Config::discover(&paths)
            .expect("discovery succeeds")
            .expect("configuration found");
        assert_eq!(found, root.path().join("pyproject.toml"));
        assert_eq!(config.line_length, Some(120));
    }

    #[test]
    fn test_common_ancestor() {
        let paths = vec![PathBuf::from("/a/b/c.py"), PathBuf::from("/a/d/e.py")];
        assert_eq!(common_ancestor(&paths), Some(PathBuf::from("/a")));
        assert_eq!(common_ancestor(&[]), None);
    }
}
