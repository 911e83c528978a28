// Application settings
// Loaded from ~/.config/readactor/settings.toml

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {origin}: {message}")]
    Parse { origin: String, message: String },
    #[error("invalid setting `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Published ReadAct person table.
pub const DEFAULT_REFERENCE_URL: &str =
    "https://raw.githubusercontent.com/readchina/ReadAct/add-wikidata_id/csv/data/Person.csv";

/// Public Wikidata query service.
pub const DEFAULT_SPARQL_ENDPOINT: &str = "https://query.wikidata.org/sparql";

/// Where the authoritative person table lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSettings {
    /// URL (`http://`, `https://`) or local path.
    pub source: String,
    pub timeout_secs: u64,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self {
            source: DEFAULT_REFERENCE_URL.into(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikidataSettings {
    pub endpoint: String,
    /// Language of gender and birthplace labels.
    pub label_language: String,
    pub timeout_secs: u64,
    /// Empty = built-in agent string
    pub user_agent: Option<String>,
}

impl Default for WikidataSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SPARQL_ENDPOINT.into(),
            label_language: "en".into(),
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconSettings {
    /// Signs annotations and `last_modified_by`.
    pub bot_name: String,
    pub max_name_results: usize,
    /// Minting past this number annotates a headroom warning.
    pub id_warn_threshold: u32,
}

impl Default for ReconSettings {
    fn default() -> Self {
        Self {
            bot_name: "SemBot".into(),
            max_name_results: 2,
            id_warn_threshold: 9999,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Relative paths resolve against the working directory.
    pub file: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("ReadActor.log"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub reference: ReferenceSettings,
    pub wikidata: WikidataSettings,
    pub recon: ReconSettings,
    pub log: LogSettings,
}

impl Settings {
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("readactor");
        config_dir.join("settings.toml")
    }

    /// Load settings from the default location, falling back to defaults
    /// when there is no file.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, &path.display().to_string())
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        Self::parse(input, "settings")
    }

    fn parse(input: &str, origin: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(input).map_err(|e| ConfigError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reference.source.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "reference.source",
                message: "must not be empty".into(),
            });
        }
        if self.wikidata.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "wikidata.endpoint",
                message: "must not be empty".into(),
            });
        }
        if self.recon.bot_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "recon.bot_name",
                message: "must not be empty".into(),
            });
        }
        if self.recon.max_name_results == 0 {
            return Err(ConfigError::Invalid {
                key: "recon.max_name_results",
                message: "must be at least 1".into(),
            });
        }
        if self.wikidata.timeout_secs == 0 || self.reference.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "timeout_secs",
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_is_all_defaults() {
        let s = Settings::from_toml("").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.recon.bot_name, "SemBot");
        assert_eq!(s.recon.max_name_results, 2);
        assert_eq!(s.log.file, PathBuf::from("ReadActor.log"));
        assert_eq!(s.reference.source, DEFAULT_REFERENCE_URL);
        assert_eq!(s.wikidata.endpoint, DEFAULT_SPARQL_ENDPOINT);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let s = Settings::from_toml(
            r#"
[recon]
bot_name = "CatBot"

[wikidata]
endpoint = "http://localhost:9999/sparql"
"#,
        )
        .unwrap();
        assert_eq!(s.recon.bot_name, "CatBot");
        assert_eq!(s.recon.id_warn_threshold, 9999);
        assert_eq!(s.wikidata.endpoint, "http://localhost:9999/sparql");
        assert_eq!(s.wikidata.label_language, "en");
    }

    #[test]
    fn type_errors_are_parse_errors() {
        let err = Settings::from_toml("[recon]\nmax_name_results = \"two\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[test]
    fn zero_results_is_invalid() {
        let err = Settings::from_toml("[recon]\nmax_name_results = 0").unwrap_err();
        match err {
            ConfigError::Invalid { key, .. } => assert_eq!(key, "recon.max_name_results"),
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[reference]\nsource = \"data/Person.csv\"\n").unwrap();

        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.reference.source, "data/Person.csv");
    }

    #[test]
    fn missing_explicit_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = Settings::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn config_path_is_under_readactor() {
        let path = Settings::config_path();
        assert!(path.ends_with("readactor/settings.toml"));
    }
}
