use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_path: Option<String>,
    pub top_albums_limit: Option<usize>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_full_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
db_path = "/var/lib/partyplay/party.db"
top_albums_limit = 20
log_level = "debug"
"#
        )
        .unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.db_path.as_deref(), Some("/var/lib/partyplay/party.db"));
        assert_eq!(config.top_albums_limit, Some(20));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_missing_keys_are_none() {
        let config: FileConfig = toml::from_str("top_albums_limit = 5").unwrap();
        assert_eq!(config.db_path, None);
        assert_eq!(config.top_albums_limit, Some(5));
    }

    #[test]
    fn test_load_errors() {
        assert!(FileConfig::load(Path::new("/nonexistent/partyplay.toml")).is_err());

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "top_albums_limit = \"many\"").unwrap();
        assert!(FileConfig::load(file.path()).is_err());
    }
}
