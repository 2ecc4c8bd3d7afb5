//! Project configuration.
//!
//! A tsconfig-like JSON object listing the component files of a project:
//!
//! ```json
//! {
//!   "files": ["src/App.vue"],
//!   "include": ["src/**/*.vue", "src/**/*.ts"],
//!   "exclude": ["src/**/*.spec.ts"]
//! }
//! ```
//!
//! Paths are relative to the project root.

use std::path::{Component, Path, PathBuf};

use glob::{glob, Pattern};
use serde::{Deserialize, Serialize};

use crate::error::{CartelError, CartelResult};

/// Extensions picked up by `include` globs.
const SUPPORTED_EXTENSIONS: &[&str] = &["vue", "ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Where the project configuration comes from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Inline JSON; `reload` re-applies the same value.
    Inline(serde_json::Value),
    /// A JSON file, re-read on `reload`.
    File(PathBuf),
}

/// File list settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Explicit files.
    pub files: Vec<String>,
    /// Glob patterns of files to include.
    pub include: Vec<String>,
    /// Glob patterns (or directories) to leave out of `include` matches.
    pub exclude: Vec<String>,
}

impl ProjectConfig {
    /// Read the configuration from a JSON value.
    pub fn from_value(value: &serde_json::Value) -> CartelResult<Self> {
        Ok(Self::deserialize(value)?)
    }

    /// Read the configuration from a JSON file.
    pub fn from_file(path: &Path) -> CartelResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CartelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load from a [`ConfigSource`].
    pub fn load(source: &ConfigSource) -> CartelResult<Self> {
        match source {
            ConfigSource::Inline(value) => Self::from_value(value),
            ConfigSource::File(path) => Self::from_file(path),
        }
    }

    /// Resolve the file list against `root_dir`.
    ///
    /// `files` are kept as listed; `include` matches are filtered by
    /// extension, `node_modules` and `exclude`. The result is sorted and
    /// free of duplicates.
    pub fn resolve_files(&self, root_dir: &Path) -> CartelResult<Vec<String>> {
        let exclude = self
            .exclude
            .iter()
            .map(|pattern| Pattern::new(&normalize_path(&root_dir.join(pattern))))
            .collect::<Result<Vec<_>, _>>()?;

        let mut files: Vec<String> = self
            .files
            .iter()
            .map(|file| normalize_path(&root_dir.join(file)))
            .collect();

        for pattern in &self.include {
            let pattern = normalize_path(&root_dir.join(pattern));
            for path in glob(&pattern)?.filter_map(Result::ok) {
                if !is_supported(&path) {
                    continue;
                }
                let path = normalize_path(&path);
                if is_excluded(&path, &exclude) {
                    continue;
                }
                files.push(path);
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }
}

fn is_supported(path: &Path) -> bool {
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext));
    supported
        && !path.to_string_lossy().ends_with(".d.ts")
        && !path.components().any(|c| c.as_os_str() == "node_modules")
}

/// A pattern excludes a path if it matches the path or one of its ancestors.
fn is_excluded(path: &str, exclude: &[Pattern]) -> bool {
    exclude.iter().any(|pattern| {
        Path::new(path)
            .ancestors()
            .any(|ancestor| pattern.matches(&ancestor.to_string_lossy()))
    })
}

/// Lexically normalized, forward-slash form of a path.
///
/// `.` components are dropped and `..` removes the preceding component, so
/// `/project/./src/../Foo.vue` and `/project/Foo.vue` name the same file.
pub(crate) fn normalize_path(path: &Path) -> String {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                // `..` above the root stays at the root.
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }
    normalized.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_empty_config() {
        let config = ProjectConfig::from_value(&serde_json::json!({})).unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert!(config.resolve_files(Path::new("/project")).unwrap().is_empty());
    }

    #[test]
    fn test_explicit_files() {
        let config = ProjectConfig::from_value(&serde_json::json!({
            "files": ["src/B.vue", "src/A.vue", "src/A.vue"]
        }))
        .unwrap();
        let files = config.resolve_files(Path::new("/project")).unwrap();
        assert_eq!(files, vec!["/project/src/A.vue", "/project/src/B.vue"]);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/project/./Foo.vue")), "/project/Foo.vue");
        assert_eq!(
            normalize_path(Path::new("/project/src/../Foo.vue")),
            "/project/Foo.vue"
        );
        assert_eq!(normalize_path(Path::new("/../Foo.vue")), "/Foo.vue");
        assert_eq!(normalize_path(Path::new("../a/./b/..")), "../a");
        assert_eq!(
            normalize_path(Path::new("/project/./src/**/*.vue")),
            "/project/src/**/*.vue"
        );
    }

    #[test]
    fn test_dotted_files_share_identity() {
        let config = ProjectConfig::from_value(&serde_json::json!({
            "files": ["./src/A.vue", "src/A.vue", "src/nested/../B.vue"]
        }))
        .unwrap();
        let files = config.resolve_files(Path::new("/project")).unwrap();
        assert_eq!(files, vec!["/project/src/A.vue", "/project/src/B.vue"]);
    }

    #[test]
    fn test_dotted_include() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/A.vue"), "").unwrap();

        let config = ProjectConfig::from_value(&serde_json::json!({
            "include": ["./src/**/*.vue", "src/*.vue"],
            "exclude": ["./src/none"]
        }))
        .unwrap();
        let files = config.resolve_files(root).unwrap();
        assert_eq!(files, vec![format!("{}/src/A.vue", normalize_path(root))]);
    }

    #[test]
    fn test_invalid_config() {
        let err = ProjectConfig::from_value(&serde_json::json!({ "files": "nope" })).unwrap_err();
        assert!(matches!(err, CartelError::Config(_)));
    }

    #[test]
    fn test_include_and_exclude() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("src/legacy")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("src/App.vue"), "").unwrap();
        fs::write(root.join("src/nested/Button.vue"), "").unwrap();
        fs::write(root.join("src/nested/util.ts"), "").unwrap();
        fs::write(root.join("src/nested/types.d.ts"), "").unwrap();
        fs::write(root.join("src/nested/readme.md"), "").unwrap();
        fs::write(root.join("src/legacy/Old.vue"), "").unwrap();
        fs::write(root.join("node_modules/pkg/Dep.vue"), "").unwrap();

        let config = ProjectConfig::from_value(&serde_json::json!({
            "include": ["src/**/*", "node_modules/**/*.vue"],
            "exclude": ["src/legacy"]
        }))
        .unwrap();
        let files = config.resolve_files(root).unwrap();
        let root = normalize_path(root);
        assert_eq!(
            files,
            vec![
                format!("{root}/src/App.vue"),
                format!("{root}/src/nested/Button.vue"),
                format!("{root}/src/nested/util.ts"),
            ]
        );
    }

    #[test]
    fn test_from_missing_file() {
        let err = ProjectConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CartelError::ConfigRead { .. }));
    }
}
