// cloudrun-logs - platform/config.rs
//
// Config directory resolution and config.toml loading with validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform path of the configuration directory.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/cloudrun-logs/)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[defaults]` section.
    pub defaults: DefaultsSection,
    /// `[api]` section.
    pub api: ApiSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[defaults]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DefaultsSection {
    /// Project used when `--project` is omitted.
    pub project_id: Option<String>,
    /// Region used when `--region` is omitted.
    pub region: Option<String>,
    /// Log entry limit used when `--limit` is omitted (<= 0 = unbounded).
    pub limit: Option<i64>,
}

/// `[api]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Cloud Logging base URL.
    pub logging_endpoint: Option<String>,
    /// Cloud Run Admin base URL.
    pub run_endpoint: Option<String>,
    /// Entries per `entries:list` page.
    pub page_size: Option<u32>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Defaults --
    pub default_project: Option<String>,
    pub default_region: String,
    pub default_limit: i64,

    // -- API --
    pub logging_endpoint: String,
    pub run_endpoint: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_project: None,
            default_region: constants::DEFAULT_REGION.to_string(),
            default_limit: constants::DEFAULT_LOG_LIMIT,
            logging_endpoint: constants::DEFAULT_LOGGING_ENDPOINT.to_string(),
            run_endpoint: constants::DEFAULT_RUN_ENDPOINT.to_string(),
            page_size: constants::DEFAULT_PAGE_SIZE,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: None,
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Load config.toml from the platform config directory.
///
/// A missing file is a normal first run (defaults, no warnings). An
/// unreadable or unparseable file also yields defaults, with the failure
/// reported as a warning so the tool still runs.
pub fn load_config(paths: &PlatformPaths) -> (AppConfig, Vec<String>) {
    let config_path = paths.config_file();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match load_config_file(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}

/// Load and validate a config file the user named explicitly.
///
/// Unlike [`load_config`], read and parse failures are errors.
pub fn load_config_file(path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let size = std::fs::metadata(path)
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if size > constants::MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max_size: constants::MAX_CONFIG_FILE_SIZE,
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), "Loaded config.toml");
    Ok(validate(raw))
}

/// Validate each field against named constants, accumulating all problems.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = AppConfig::default();

    // -- Defaults: project_id --
    if let Some(project) = raw.defaults.project_id {
        let project = project.trim();
        if project.is_empty() {
            warnings.push("[defaults] project_id is empty. Ignoring it.".to_string());
        } else {
            config.default_project = Some(project.to_string());
        }
    }

    // -- Defaults: region --
    if let Some(region) = raw.defaults.region {
        let region = region.trim();
        if region.is_empty() {
            warnings.push(format!(
                "[defaults] region is empty. Using default ({}).",
                constants::DEFAULT_REGION
            ));
        } else {
            config.default_region = region.to_string();
        }
    }

    // -- Defaults: limit (any value; <= 0 means unbounded) --
    if let Some(limit) = raw.defaults.limit {
        config.default_limit = limit;
    }

    // -- API: endpoints --
    if let Some(endpoint) = raw.api.logging_endpoint {
        match check_endpoint("logging_endpoint", &endpoint) {
            Ok(()) => config.logging_endpoint = endpoint,
            Err(msg) => warnings.push(msg),
        }
    }
    if let Some(endpoint) = raw.api.run_endpoint {
        match check_endpoint("run_endpoint", &endpoint) {
            Ok(()) => config.run_endpoint = endpoint,
            Err(msg) => warnings.push(msg),
        }
    }

    // -- API: page_size --
    if let Some(size) = raw.api.page_size {
        if (constants::MIN_PAGE_SIZE..=constants::MAX_PAGE_SIZE).contains(&size) {
            config.page_size = size;
        } else {
            warnings.push(format!(
                "[api] page_size = {size} is out of range ({}-{}). Using default ({}).",
                constants::MIN_PAGE_SIZE,
                constants::MAX_PAGE_SIZE,
                constants::DEFAULT_PAGE_SIZE,
            ));
        }
    }

    // -- API: request_timeout_secs --
    if let Some(secs) = raw.api.request_timeout_secs {
        if (constants::MIN_REQUEST_TIMEOUT_SECS..=constants::MAX_REQUEST_TIMEOUT_SECS)
            .contains(&secs)
        {
            config.request_timeout_secs = secs;
        } else {
            warnings.push(format!(
                "[api] request_timeout_secs = {secs} is out of range ({}-{}). Using default ({}).",
                constants::MIN_REQUEST_TIMEOUT_SECS,
                constants::MAX_REQUEST_TIMEOUT_SECS,
                constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            ));
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: {}. Using default ({}).",
                constants::VALID_LOG_LEVELS.join(", "),
                constants::DEFAULT_LOG_LEVEL,
            ));
        }
    }

    (config, warnings)
}

fn check_endpoint(field: &str, value: &str) -> Result<(), String> {
    if value.starts_with("https://") || value.starts_with("http://") {
        Ok(())
    } else {
        Err(format!(
            "[api] {field} = \"{value}\" must start with http:// or https://. Using default."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn parse(toml_text: &str) -> (AppConfig, Vec<String>) {
        validate(toml::from_str(toml_text).unwrap())
    }

    #[test]
    fn test_empty_config_is_default() {
        let (config, warnings) = parse("");
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_values_applied() {
        let (config, warnings) = parse(
            r#"
            [defaults]
            project_id = "demo-project"
            region = "europe-west4"
            limit = 0

            [api]
            page_size = 500
            request_timeout_secs = 90
            logging_endpoint = "http://127.0.0.1:8085"

            [logging]
            level = "debug"
            "#,
        );
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.default_project.as_deref(), Some("demo-project"));
        assert_eq!(config.default_region, "europe-west4");
        assert_eq!(config.default_limit, 0);
        assert_eq!(config.page_size, 500);
        assert_eq!(config.request_timeout_secs, 90);
        assert_eq!(config.logging_endpoint, "http://127.0.0.1:8085");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_fall_back_with_warnings() {
        let (config, warnings) = parse(
            r#"
            [api]
            page_size = 5000
            request_timeout_secs = 0
            run_endpoint = "ftp://example"

            [logging]
            level = "loud"
            "#,
        );
        assert_eq!(warnings.len(), 4, "warnings: {warnings:?}");
        assert_eq!(config.page_size, constants::DEFAULT_PAGE_SIZE);
        assert_eq!(
            config.request_timeout_secs,
            constants::DEFAULT_REQUEST_TIMEOUT_SECS
        );
        assert_eq!(config.run_endpoint, constants::DEFAULT_RUN_ENDPOINT);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (_, warnings) = parse("[future]\nflag = true\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PlatformPaths {
            config_dir: dir.path().to_path_buf(),
        };
        let (config, warnings) = load_config(&paths);
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unparseable_file_warns_but_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(constants::CONFIG_FILE_NAME), "[defaults\n").unwrap();
        let paths = PlatformPaths {
            config_dir: dir.path().to_path_buf(),
        };
        let (config, warnings) = load_config(&paths);
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_explicit_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            load_config_file(&missing),
            Err(ConfigError::Io { .. })
        ));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "limit = [").unwrap();
        assert!(matches!(
            load_config_file(&bad),
            Err(ConfigError::TomlParse { .. })
        ));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let big = dir.path().join("big.toml");
        let padding = "# pad\n".repeat((constants::MAX_CONFIG_FILE_SIZE as usize / 6) + 10);
        fs::write(&big, padding).unwrap();
        assert!(matches!(
            load_config_file(&big),
            Err(ConfigError::FileTooLarge { .. })
        ));
    }
}
