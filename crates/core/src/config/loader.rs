//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed settings, defaults when no file was found
    pub schema: ConfigSchema,
    /// File the settings came from
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist. Without one, the standard locations are
    /// searched and defaults apply when none is present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let candidates = [".buildplan.toml", "buildplan.toml"];

    for candidate in candidates {
        let path = Path::new(candidate);
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("buildplan").join("config.toml"))
        .filter(|p| p.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::new(
            ErrorCode::ConfigError,
            format!("Failed to read config file {}: {}", path.display(), e),
        )
        .with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::new(
            ErrorCode::ConfigParseError,
            format!("Failed to parse config file {}: {}", path.display(), e),
        )
        .with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEBUG_IDENTITY;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.general.output_format, "json");
        assert!(config.schema.signing.include_debug);
    }

    #[test]
    fn test_default_identities_contain_debug() {
        let identities = Config::default().schema.signing.resolved_identities();
        assert_eq!(identities.len(), 1);
        assert_eq!(identities[0].name, DEBUG_IDENTITY);
    }

    #[test]
    fn test_config_load_explicit_file() {
        let file = write_config(
            r#"
[general]
output_format = "toml"

[[signing.identities]]
name = "release"
key_ref = "/secure/release.jks"
"#,
        );

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.schema.general.output_format, "toml");

        let names: Vec<_> = config
            .schema
            .signing
            .resolved_identities()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["debug", "release"]);
    }

    #[test]
    fn test_config_without_debug_identity() {
        let file = write_config(
            r#"
[signing]
include_debug = false
"#,
        );

        let config = Config::load(Some(file.path())).unwrap();
        assert!(config.schema.signing.resolved_identities().is_empty());
    }

    #[test]
    fn test_declared_debug_identity_replaces_builtin() {
        let file = write_config(
            r#"
[[signing.identities]]
name = "debug"
key_ref = "/team/shared-debug.keystore"
"#,
        );

        let config = Config::load(Some(file.path())).unwrap();
        let identities = config.schema.signing.resolved_identities();
        assert_eq!(identities.len(), 1);
        assert_eq!(identities[0].key_ref, "/team/shared-debug.keystore");
    }

    #[test]
    fn test_config_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/buildplan.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_config_load_malformed_file() {
        let file = write_config("[signing\ninclude_debug = ");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert_eq!(err.exit_code(), crate::error::exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn test_config_rejects_unknown_section() {
        let file = write_config("[commit_msg]\nmax_length = 72\n");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }
}
