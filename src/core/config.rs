/*
 * Application settings for the form: where the conversion service lives, how
 * long to wait for it, and the timing of the post-conversion re-check. Settings
 * are stored as JSON in the platform's local configuration directory
 * (e.g. AppData/Local on Windows, ~/.config on Linux).
 *
 * Access goes through `ConfigManagerOperations` so the presenter can be tested
 * with an in-memory implementation. A missing file is not an error; it yields
 * `AppConfig::default()`.
 */
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

const CONFIG_FILENAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_base_url: String,
    pub request_timeout_secs: u64,
    // Delay before the second download-availability probe on the result page.
    pub preview_recheck_delay_ms: u64,
    pub image_styling_default: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server_base_url: "http://127.0.0.1:5055".to_string(),
            request_timeout_secs: 120,
            preview_recheck_delay_ms: 600,
            image_styling_default: false,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoProjectDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Configuration format error: {e}"),
            ConfigError::NoProjectDirectory => {
                write!(f, "Could not determine directory for configuration")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            ConfigError::NoProjectDirectory => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub trait ConfigManagerOperations: Send + Sync {
    fn load_config(&self, app_name: &str) -> Result<AppConfig>;
    fn save_config(&self, app_name: &str, config: &AppConfig) -> Result<()>;
}

/*
 * File-backed configuration. `config_dir_override` pins the directory, which
 * is how tests keep away from the real user profile.
 */
pub struct CoreConfigManager {
    config_dir_override: Option<PathBuf>,
}

impl CoreConfigManager {
    pub fn new() -> Self {
        CoreConfigManager {
            config_dir_override: None,
        }
    }

    #[cfg(test)]
    pub fn with_config_dir(dir: PathBuf) -> Self {
        CoreConfigManager {
            config_dir_override: Some(dir),
        }
    }

    /*
     * Resolves the directory holding `config.json` and creates it if needed.
     * Without an override the local (non-roaming) config directory reported by
     * `ProjectDirs` for `app_name` is used.
     */
    fn config_dir(&self, app_name: &str) -> Result<PathBuf> {
        let dir = match &self.config_dir_override {
            Some(dir) => dir.clone(),
            None => ProjectDirs::from("", "", app_name)
                .map(|dirs| dirs.config_local_dir().to_path_buf())
                .ok_or(ConfigError::NoProjectDirectory)?,
        };
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            log::debug!("CoreConfigManager: Created config directory {dir:?}");
        }
        Ok(dir)
    }
}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    fn load_config(&self, app_name: &str) -> Result<AppConfig> {
        let file_path = self.config_dir(app_name)?.join(CONFIG_FILENAME);
        if !file_path.exists() {
            log::debug!("CoreConfigManager: {file_path:?} does not exist, using defaults.");
            return Ok(AppConfig::default());
        }
        let reader = BufReader::new(File::open(&file_path)?);
        let config: AppConfig = serde_json::from_reader(reader)?;
        log::debug!("CoreConfigManager: Loaded {config:?} from {file_path:?}");
        Ok(config)
    }

    fn save_config(&self, app_name: &str, config: &AppConfig) -> Result<()> {
        let file_path = self.config_dir(app_name)?.join(CONFIG_FILENAME);
        let writer = BufWriter::new(File::create(&file_path)?);
        serde_json::to_writer_pretty(writer, config)?;
        log::debug!("CoreConfigManager: Saved config to {file_path:?}");
        Ok(())
    }
}
