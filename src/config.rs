use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::model::Target;
use crate::notion::DEFAULT_BASE_URL;

pub const TOKEN_VAR: &str = "NOTION_AUTH";
pub const HIGHLIGHTS_DB_VAR: &str = "HIGHLIGHTS_DB_ID";
pub const LIBRARY_DB_VAR: &str = "LIBRARY_DB_ID";
pub const TEST_DB_VAR: &str = "TEST_DB_ID";

const DEFAULT_TITLE_PROPERTY: &str = "Name";
const DEFAULT_BOOKS_DIR: &str = "books";

#[derive(Parser, Debug, Default)]
#[command(name = "clippings")]
#[command(about = "Imports e-reader highlight exports into Notion", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,

    /// CSV export to import; prompted for when omitted
    #[arg(long)]
    pub csv: Option<String>,

    /// Title of the book in the library database; prompted for when omitted
    #[arg(short, long)]
    pub book: Option<String>,

    /// Write to the test database without asking
    #[arg(long, conflicts_with = "production")]
    pub test: bool,

    /// Write to the highlights database without asking
    #[arg(long)]
    pub production: bool,

    /// Skip the final confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Directory relative CSV names are looked up in
    #[arg(long)]
    pub books_dir: Option<PathBuf>,

    /// Look each book title up once per run instead of once per highlight
    #[arg(long)]
    pub cache_lookups: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn target(&self) -> Option<Target> {
        match (self.test, self.production) {
            (true, _) => Some(Target::Test),
            (false, true) => Some(Target::Production),
            (false, false) => None,
        }
    }
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".clippings")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub notion: NotionSection,
    #[serde(default)]
    pub import: ImportSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct NotionSection {
    pub token: Option<String>,
    pub highlights_db_id: Option<String>,
    pub library_db_id: Option<String>,
    pub test_db_id: Option<String>,
    pub base_url: Option<String>,
    pub title_property: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ImportSection {
    pub books_dir: Option<PathBuf>,
}

#[derive(Clone)]
pub struct NotionConfig {
    pub token: String,
    pub highlights_db_id: String,
    pub library_db_id: String,
    pub test_db_id: String,
    pub base_url: String,
    pub title_property: String,
}

impl NotionConfig {
    pub fn database_for(&self, target: Target) -> &str {
        match target {
            Target::Test => &self.test_db_id,
            Target::Production => &self.highlights_db_id,
        }
    }
}

impl std::fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionConfig")
            .field("token", &"<redacted>")
            .field("highlights_db_id", &self.highlights_db_id)
            .field("library_db_id", &self.library_db_id)
            .field("test_db_id", &self.test_db_id)
            .field("base_url", &self.base_url)
            .field("title_property", &self.title_property)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub notion: NotionConfig,
    pub books_dir: PathBuf,
}

impl Config {
    /// Loads settings from the process environment, filling gaps from the YAML
    /// file at `path` when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => Config::load_file(path, |name| env::var(name).ok())?,
            None => FileConfig::default(),
        };
        Config::from_sources(file, |name| env::var(name).ok())
    }

    fn load_file<F>(path: &Path, lookup: F) -> Result<FileConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let yaml_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let yaml_with_env = Config::substitute_env_vars(&yaml_str, lookup);
        if yaml_with_env.trim().is_empty() {
            return Ok(FileConfig::default());
        }
        Ok(serde_yaml::from_str(&yaml_with_env)?)
    }

    pub fn from_sources<F>(file: FileConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |var: &'static str, from_file: Option<String>| {
            lookup(var)
                .filter(|v| !v.is_empty())
                .or(from_file.filter(|v| !v.is_empty()))
                .ok_or(ConfigError::Missing(var))
        };

        let notion = NotionConfig {
            token: pick(TOKEN_VAR, file.notion.token)?,
            highlights_db_id: pick(HIGHLIGHTS_DB_VAR, file.notion.highlights_db_id)?,
            library_db_id: pick(LIBRARY_DB_VAR, file.notion.library_db_id)?,
            test_db_id: pick(TEST_DB_VAR, file.notion.test_db_id)?,
            base_url: file
                .notion
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            title_property: file
                .notion
                .title_property
                .unwrap_or_else(|| DEFAULT_TITLE_PROPERTY.to_string()),
        };

        Ok(Config {
            notion,
            books_dir: file
                .import
                .books_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BOOKS_DIR)),
        })
    }

    /// Relative names are looked up in the books directory first, then as given.
    pub fn csv_path(&self, name: &str) -> PathBuf {
        let given = PathBuf::from(name);
        if given.is_absolute() {
            return given;
        }
        let in_books = self.books_dir.join(&given);
        if in_books.is_file() || !given.is_file() {
            in_books
        } else {
            given
        }
    }

    fn substitute_env_vars<F>(yaml_str: &str, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            let Some(end) = result[actual_start..].find('}') else {
                break;
            };
            let var_name = &result[actual_start + 2..actual_start + end];

            // ${VAR:-default}
            let env_value = match var_name.split_once(":-") {
                Some((var, default_val)) => lookup(var).unwrap_or_else(|| default_val.to_string()),
                None => lookup(var_name).unwrap_or_else(|| {
                    tracing::warn!(var = var_name, "environment variable not found");
                    String::new()
                }),
            };

            result.replace_range(actual_start..actual_start + end + 1, &env_value);
            offset = actual_start + env_value.len();
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn full_env() -> impl Fn(&str) -> Option<String> + use<> {
        env_of(&[
            (TOKEN_VAR, "secret_abc"),
            (HIGHLIGHTS_DB_VAR, "hl"),
            (LIBRARY_DB_VAR, "lib"),
            (TEST_DB_VAR, "test"),
        ])
    }

    #[test]
    fn test_from_environment_with_defaults() {
        let cfg = Config::from_sources(FileConfig::default(), full_env()).unwrap();
        assert_eq!(cfg.notion.token, "secret_abc");
        assert_eq!(cfg.notion.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.notion.title_property, "Name");
        assert_eq!(cfg.books_dir, PathBuf::from("books"));
        assert_eq!(cfg.notion.database_for(Target::Test), "test");
        assert_eq!(cfg.notion.database_for(Target::Production), "hl");
    }

    #[test]
    fn test_missing_token_fails_fast() {
        let env = env_of(&[(HIGHLIGHTS_DB_VAR, "hl"), (LIBRARY_DB_VAR, "lib"), (TEST_DB_VAR, "t")]);
        let err = Config::from_sources(FileConfig::default(), env).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(TOKEN_VAR)));
    }

    #[test]
    fn test_file_fills_gaps_and_env_wins() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            "notion:\n  token: ${{FILE_TOKEN}}\n  highlights_db_id: file-hl\n  library_db_id: ${{LIB:-lib-default}}\n  test_db_id: file-test\n  title_property: Title\nimport:\n  books_dir: exports\n"
        )
        .unwrap();

        let file_env = env_of(&[("FILE_TOKEN", "from-file")]);
        let file = Config::load_file(tmp.path(), file_env).unwrap();
        let cfg = Config::from_sources(file, env_of(&[(TEST_DB_VAR, "env-test")])).unwrap();

        assert_eq!(cfg.notion.token, "from-file");
        assert_eq!(cfg.notion.highlights_db_id, "file-hl");
        assert_eq!(cfg.notion.library_db_id, "lib-default");
        assert_eq!(cfg.notion.test_db_id, "env-test");
        assert_eq!(cfg.notion.title_property, "Title");
        assert_eq!(cfg.books_dir, PathBuf::from("exports"));
    }

    #[test]
    fn test_substitute_unknown_var_is_blank() {
        let out = Config::substitute_env_vars("a: ${NOPE}\nb: ${X:-y}", env_of(&[]));
        assert_eq!(out, "a: \nb: y");
    }

    #[test]
    fn test_debug_redacts_token() {
        let cfg = Config::from_sources(FileConfig::default(), full_env()).unwrap();
        let dbg = format!("{:?}", cfg);
        assert!(!dbg.contains("secret_abc"));
    }

    #[test]
    fn test_cli_target_flags() {
        let cli = Cli::parse_from(["clippings", "--test"]);
        assert_eq!(cli.target(), Some(Target::Test));
        let cli = Cli::parse_from(["clippings", "--production", "--csv", "a.csv"]);
        assert_eq!(cli.target(), Some(Target::Production));
        assert_eq!(cli.csv.as_deref(), Some("a.csv"));
        let cli = Cli::parse_from(["clippings"]);
        assert_eq!(cli.target(), None);
        assert!(Cli::try_parse_from(["clippings", "--test", "--production"]).is_err());
    }
}
