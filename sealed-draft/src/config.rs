// Configuration loading and parsing (config/draft.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// Card catalog file (.json or .csv).
    pub catalog_path: String,
    /// SQLite file, already resolved to a concrete path.
    pub db_path: String,
    pub logging: LoggingConfig,
    pub display: DisplayConfig,
}

// ---------------------------------------------------------------------------
// draft.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire draft.toml file.
#[derive(Debug, Clone, Deserialize)]
struct DraftFile {
    catalog: CatalogSection,
    #[serde(default)]
    database: DatabaseSection,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogSection {
    path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DatabaseSection {
    /// Empty means "use the platform data directory".
    #[serde(default)]
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "sealed_draft=info,warn".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// How many recent picks the status view lists.
    #[serde(default = "default_log_tail")]
    pub log_tail: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            log_tail: default_log_tail(),
        }
    }
}

fn default_log_tail() -> usize {
    8
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Database file name used when no explicit path is configured.
const DEFAULT_DB_FILE: &str = "sealed-draft.db";

/// Parse and validate `base_dir/config/draft.toml` as it stands, without
/// seeding from defaults.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let draft_path = base_dir.join("config").join("draft.toml");
    let text = read_file(&draft_path)?;
    let file: DraftFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: draft_path.clone(),
        source: e,
    })?;

    let config = Config {
        catalog_path: file.catalog.path,
        db_path: resolve_db_path(&file.database.path),
        logging: file.logging,
        display: file.display,
    };

    validate(&config)?;

    Ok(config)
}

/// Turn the configured database path into a concrete one. A blank setting
/// maps to `sealed-draft.db` inside the platform data directory, falling back
/// to the working directory when no home directory is known.
pub fn resolve_db_path(configured: &str) -> String {
    let configured = configured.trim();
    if !configured.is_empty() {
        return configured.to_string();
    }
    directories::ProjectDirs::from("", "", "sealed-draft")
        .map(|dirs| dirs.data_dir().join(DEFAULT_DB_FILE).display().to_string())
        .unwrap_or_else(|| DEFAULT_DB_FILE.to_string())
}

/// Seed `config/` from `defaults/`, copying only files the user does not
/// already have. `.example` files are left behind. Returns what was copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");
    let copy_error = |message: String| ConfigError::DefaultsCopyError { message };

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(copy_error(format!(
            "no defaults/ or config/ directory under {}; run from the package root",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?;

    let mut copied = Vec::new();
    for entry in entries {
        let source = entry
            .map_err(|e| copy_error(format!("cannot read defaults entry: {e}")))?
            .path();
        let Some(name) = source.file_name().filter(|_| source.is_file()) else {
            continue;
        };
        if name.to_string_lossy().ends_with(".example") {
            continue;
        }

        let target = config_dir.join(name);
        if target.exists() {
            continue;
        }
        std::fs::copy(&source, &target).map_err(|e| {
            copy_error(format!(
                "cannot copy {} to {}: {e}",
                source.display(),
                target.display()
            ))
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Load config from the working directory, seeding it from defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.catalog_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "catalog.path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.display.log_tail == 0 {
        return Err(ConfigError::ValidationError {
            field: "display.log_tail".into(),
            message: "must be > 0".into(),
        });
    }

    if config.logging.filter.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.filter".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// The package root, whether tests run from the package or the workspace.
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("sealed-draft/defaults").exists() {
            cwd.join("sealed-draft")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    /// Helper: a scratch directory with `config/draft.toml` holding `body`.
    fn scratch_config(name: &str, body: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config/draft.toml"), body).unwrap();
        tmp
    }

    #[test]
    fn default_config_file_loads() {
        let root = project_root();
        let text = fs::read_to_string(root.join("defaults/draft.toml")).unwrap();
        let tmp = scratch_config("sealed_draft_cfg_defaults", &text);

        let config = load_config_from(&tmp).expect("defaults should load");
        assert_eq!(config.catalog_path, "data/cards.json");
        assert_eq!(config.logging.filter, "sealed_draft=info,warn");
        assert_eq!(config.display.log_tail, 8);
        assert!(config.db_path.ends_with(DEFAULT_DB_FILE));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let tmp = scratch_config(
            "sealed_draft_cfg_minimal",
            "[catalog]\npath = \"cards.csv\"\n",
        );
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.catalog_path, "cards.csv");
        assert_eq!(config.display.log_tail, 8);
        assert_eq!(config.logging.filter, "sealed_draft=info,warn");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn explicit_database_path_is_kept() {
        let tmp = scratch_config(
            "sealed_draft_cfg_dbpath",
            "[catalog]\npath = \"cards.json\"\n[database]\npath = \"my.db\"\n",
        );
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.db_path, "my.db");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_file_is_reported() {
        let tmp = std::env::temp_dir().join("sealed_draft_cfg_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let tmp = scratch_config("sealed_draft_cfg_bad", "[catalog\npath = 1");
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn zero_log_tail_fails_validation() {
        let tmp = scratch_config(
            "sealed_draft_cfg_tail",
            "[catalog]\npath = \"cards.json\"\n[display]\nlog_tail = 0\n",
        );
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "display.log_tail"),
            other => panic!("expected ValidationError, got {other:?}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn empty_catalog_path_fails_validation() {
        let tmp = scratch_config("sealed_draft_cfg_catalog", "[catalog]\npath = \"  \"\n");
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "catalog.path"),
            other => panic!("expected ValidationError, got {other:?}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_once() {
        let tmp = std::env::temp_dir().join("sealed_draft_cfg_copy");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults/draft.toml"), "[catalog]\npath = \"a.json\"\n").unwrap();
        fs::write(tmp.join("defaults/draft.toml.example"), "ignored").unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(copied, vec![tmp.join("config/draft.toml")]);
        assert!(!tmp.join("config/draft.toml.example").exists());

        fs::write(tmp.join("config/draft.toml"), "[catalog]\npath = \"edited.json\"\n").unwrap();
        let copied_again = ensure_config_files(&tmp).unwrap();
        assert!(copied_again.is_empty());
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.catalog_path, "edited.json");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_without_either_dir() {
        let tmp = std::env::temp_dir().join("sealed_draft_cfg_nodirs");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let err = ensure_config_files(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsCopyError { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn blank_db_path_resolves_to_default_file() {
        let resolved = resolve_db_path("   ");
        assert!(resolved.ends_with(DEFAULT_DB_FILE));
    }
}
