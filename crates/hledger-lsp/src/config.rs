//! Server configuration.
//!
//! The only configuration channel is the `initializationOptions` object of
//! the `initialize` request:
//!
//! ```json
//! { "filesystemRoot": "/home/me/finance", "maxIncludeDepth": 16 }
//! ```
//!
//! Unknown fields are ignored and missing ones take their defaults.

use std::path::PathBuf;

use hledger_loader::DEFAULT_MAX_INCLUDE_DEPTH;
use serde::Deserialize;

/// Settings taken from the client's initialization options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Directory that document paths (with their leading `/` removed) are
    /// resolved against when a file is not open in the editor.
    pub filesystem_root: PathBuf,
    /// Maximum nesting of `include` directives.
    pub max_include_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filesystem_root: PathBuf::from("/"),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }
}

impl Config {
    /// Read the configuration from `initializationOptions`.
    ///
    /// Absent options give the defaults. Malformed options are logged and
    /// also give the defaults, so a bad client setting never stops the
    /// server from starting.
    pub fn from_initialization_options(options: Option<serde_json::Value>) -> Self {
        let Some(options) = options.filter(|value| !value.is_null()) else {
            return Self::default();
        };
        match serde_json::from_value(options) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Ignoring invalid initialization options: {}", err);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_without_options() {
        let config = Config::from_initialization_options(None);
        assert_eq!(config.filesystem_root, PathBuf::from("/"));
        assert_eq!(config.max_include_depth, DEFAULT_MAX_INCLUDE_DEPTH);
        assert_eq!(
            Config::from_initialization_options(Some(serde_json::Value::Null)),
            Config::default()
        );
    }

    #[test]
    fn test_reads_camel_case_fields() {
        let config = Config::from_initialization_options(Some(json!({
            "filesystemRoot": "/srv/ledger",
            "maxIncludeDepth": 8,
        })));
        assert_eq!(config.filesystem_root, PathBuf::from("/srv/ledger"));
        assert_eq!(config.max_include_depth, 8);
    }

    #[test]
    fn test_partial_options_keep_other_defaults() {
        let config = Config::from_initialization_options(Some(json!({ "maxIncludeDepth": 3 })));
        assert_eq!(config.filesystem_root, PathBuf::from("/"));
        assert_eq!(config.max_include_depth, 3);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let config = Config::from_initialization_options(Some(json!({ "colour": "blue" })));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_options_fall_back_to_defaults() {
        let config =
            Config::from_initialization_options(Some(json!({ "maxIncludeDepth": "deep" })));
        assert_eq!(config, Config::default());
    }
}
