//! Error types for component meta extraction.

use std::path::PathBuf;

/// Error type for checker operations.
#[derive(Debug, thiserror::Error)]
pub enum CartelError {
    /// The component file has no export with the requested name.
    #[error("Could not find export `{export}` in `{file}`")]
    MissingExport { file: String, export: String },

    /// The checker could not resolve the module symbol of a file.
    #[error("Could not resolve module `{file}`")]
    ModuleNotResolved { file: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Project configuration could not be read.
    #[error("Failed to read project config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Project configuration is not valid JSON.
    #[error("Invalid project config: {0}")]
    Config(#[from] serde_json::Error),

    /// Invalid `include`/`exclude` glob.
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Result type for checker operations.
pub type CartelResult<T> = Result<T, CartelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_export_message() {
        let error = CartelError::MissingExport {
            file: "/src/Button.vue".to_string(),
            export: "Foo".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("`Foo`"));
        assert!(msg.contains("/src/Button.vue"));
    }

    #[test]
    fn test_module_not_resolved_message() {
        let error = CartelError::ModuleNotResolved {
            file: "/src/Broken.vue.meta.ts".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Could not resolve module `/src/Broken.vue.meta.ts`"
        );
    }

    #[test]
    fn test_config_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: CartelError = json_error.into();
        assert!(error.to_string().starts_with("Invalid project config"));
    }
}
