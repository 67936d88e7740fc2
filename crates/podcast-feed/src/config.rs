// crates/podcast-feed/src/config.rs
//! Package configuration
//!
//! The only section is `defaults`: fallback values keyed by field name, used
//! for any field a channel header or episode leaves out.
//!
//! ```toml
//! [defaults]
//! author = "StoryStream"
//! atom_link = "https://example.com/feed.xml"
//! explicit = "no"
//!
//! [defaults.categories]
//! Arts = ["Books"]
//! ```

use crate::error::{FeedError, FeedResult};
use crate::value::{Fields, Value};
use serde::Deserialize;
use std::path::Path;

/// Configuration shared by every feed a builder produces
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Per-field fallback values
    pub defaults: Fields,
}

impl PackageConfig {
    /// Creates a config without defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config from a defaults map
    pub fn with_defaults(defaults: Fields) -> Self {
        Self { defaults }
    }

    /// Parses a config from TOML text
    pub fn from_toml_str(content: &str) -> FeedResult<Self> {
        toml::from_str(content).map_err(|source| FeedError::ConfigParse { path: None, source })
    }

    /// Reads and parses a TOML config file
    pub fn load(path: impl AsRef<Path>) -> FeedResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| FeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&content).map_err(|source| FeedError::ConfigParse {
            path: Some(path.to_path_buf()),
            source,
        })?;

        log::debug!(
            "Loaded {} feed defaults from {}",
            config.defaults.len(),
            path.display()
        );
        Ok(config)
    }

    /// Returns the default registered for a field
    pub fn default_for(&self, field: &str) -> Option<&Value> {
        self.defaults.get(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_toml_str() {
        let config = PackageConfig::from_toml_str(
            r#"
[defaults]
author = "Jane"
feed_season = 1
explicit = false

[defaults.categories]
Technology = {}
Arts = ["Zebra", "Books"]
Comedy = {}
"#,
        )
        .expect("valid config");

        assert_eq!(config.default_for("author"), Some(&Value::from("Jane")));
        assert_eq!(config.default_for("feed_season"), Some(&Value::Integer(1)));
        assert_eq!(config.default_for("explicit"), Some(&Value::Bool(false)));

        let Some(Value::Categories(tree)) = config.default_for("categories") else {
            panic!("categories should load as a taxonomy");
        };
        let top: Vec<&str> = tree.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(top, vec!["Technology", "Arts", "Comedy"]);
        let arts: Vec<&str> = tree.nodes()[1]
            .children
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(arts, vec!["Zebra", "Books"]);
    }

    #[test]
    fn test_numeric_category_marker_loads() {
        let config = PackageConfig::from_toml_str("[defaults.categories]\nArts = 1\nComedy = {}")
            .expect("numeric marker is tolerated");

        assert!(matches!(
            config.default_for("categories"),
            Some(Value::Categories(tree)) if tree.len() == 2
        ));
    }

    #[test]
    fn test_native_toml_dates_load_as_text() {
        let config = PackageConfig::from_toml_str(
            "[defaults]\npublish_at = 2024-01-01T00:00:00Z\nrecorded = 2024-02-03",
        )
        .expect("native dates are accepted");

        assert_eq!(
            config.default_for("publish_at"),
            Some(&Value::from("2024-01-01T00:00:00Z"))
        );
        assert_eq!(config.default_for("recorded"), Some(&Value::from("2024-02-03")));
    }

    #[test]
    fn test_missing_defaults_section() {
        let config = PackageConfig::from_toml_str("").expect("empty config is valid");
        assert!(config.defaults.is_empty());
    }

    #[test]
    fn test_invalid_toml() {
        let result = PackageConfig::from_toml_str("[defaults\nauthor = ");
        assert!(matches!(result, Err(FeedError::ConfigParse { path: None, .. })));
    }

    #[test]
    fn test_load_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[defaults]\nlanguage = \"en-us\"")?;

        let config = PackageConfig::load(file.path())?;
        assert_eq!(config.default_for("language"), Some(&Value::from("en-us")));
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let result = PackageConfig::load("/definitely/not/here/podcast.toml");
        assert!(matches!(result, Err(FeedError::Io { .. })));
    }
}
