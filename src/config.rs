use crate::error::ConfigError;
use scaffold_protocol::DEFAULT_LINE_BREAK;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "scaffold_service.json";

/// One raw `index_files` entry as written in the service config.
#[derive(Default, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct IndexFileConfig {
    #[serde(rename = "Blast database", default)]
    pub store_id: Option<String>,
    #[serde(rename = "Fasta", default)]
    pub fasta: Option<String>,
}

/// `index_files` may hold a single object or an array of them.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum IndexFiles {
    Many(Vec<IndexFileConfig>),
    One(IndexFileConfig),
}

impl IndexFiles {
    pub fn entries(&self) -> &[IndexFileConfig] {
        match self {
            Self::Many(entries) => entries,
            Self::One(entry) => std::slice::from_ref(entry),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ServiceConfig {
    pub index_files: IndexFiles,
    /// Provider name used to qualify store ids when peer stores are paired.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default = "default_line_break")]
    pub default_line_break: u32,
    #[serde(default)]
    pub max_record_bytes: Option<usize>,
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_line_break() -> u32 {
    DEFAULT_LINE_BREAK
}

impl ServiceConfig {
    pub fn from_json_file(path: &str) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let mut config = Self::parse(&text, path)?;
        config.base_dir = Path::new(path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(config)
    }

    /// Parses inline JSON; relative FASTA paths resolve against the working
    /// directory.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, "<inline>")
    }

    fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Json {
            path: origin.to_string(),
            source,
        })?;
        if config.index_files.entries().is_empty() {
            return Err(ConfigError::NoIndexFiles(origin.to_string()));
        }
        config.base_dir = PathBuf::from(".");
        Ok(config)
    }

    /// Where a configured `Fasta` value lives on disk. `file://` values are
    /// taken literally, other relative values sit next to the config file.
    pub fn locate_fasta(&self, configured: &str) -> PathBuf {
        match configured.strip_prefix("file://") {
            Some(local) => PathBuf::from(local),
            None if Path::new(configured).is_relative() => self.base_dir.join(configured),
            None => PathBuf::from(configured),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_single_object_index_files() {
        let config = ServiceConfig::from_json_str(
            r#"{"index_files": {"Blast database": "wheatA", "Fasta": "/data/wheatA.fa"}}"#,
        )
        .unwrap();
        assert_eq!(config.index_files.entries().len(), 1);
        assert_eq!(
            config.index_files.entries()[0].store_id.as_deref(),
            Some("wheatA")
        );
        assert_eq!(config.default_line_break, 60);
        assert_eq!(config.max_record_bytes, None);
        assert_eq!(config.provider, None);
    }

    #[test]
    fn test_array_index_files_keep_order() {
        let config = ServiceConfig::from_json_str(
            r#"{
  "index_files": [
    {"Blast database": "b", "Fasta": "/data/b.fa"},
    {"Fasta": "/data/a.fa"},
    {"Blast database": "c"}
  ],
  "provider": "node-a",
  "default_line_break": 80,
  "max_record_bytes": 1024
}"#,
        )
        .unwrap();
        let entries = config.index_files.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].fasta.as_deref(), Some("/data/b.fa"));
        assert_eq!(entries[1].store_id, None);
        assert_eq!(entries[2].fasta, None);
        assert_eq!(config.provider.as_deref(), Some("node-a"));
        assert_eq!(config.default_line_break, 80);
        assert_eq!(config.max_record_bytes, Some(1024));
    }

    #[test]
    fn test_missing_index_files_is_a_parse_error() {
        let err = ServiceConfig::from_json_str(r#"{"provider": "x"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn test_empty_index_files_rejected() {
        let err = ServiceConfig::from_json_str(r#"{"index_files": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::NoIndexFiles(_)));
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let td = tempdir().unwrap();
        let config_path = td.path().join("service.json");
        fs::write(
            &config_path,
            r#"{"index_files": [{"Blast database": "toy", "Fasta": "genomes/toy.fa"}]}"#,
        )
        .unwrap();
        let config = ServiceConfig::from_json_file(&config_path.to_string_lossy()).unwrap();
        assert_eq!(
            config.locate_fasta("genomes/toy.fa"),
            td.path().join("genomes/toy.fa")
        );
        assert_eq!(
            config.locate_fasta("file:///abs/toy.fa"),
            PathBuf::from("/abs/toy.fa")
        );
    }

    #[test]
    fn test_unreadable_config_file() {
        let err = ServiceConfig::from_json_file("/nonexistent/service.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
