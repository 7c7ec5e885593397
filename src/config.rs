use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use toml;
use tracing::{info, warn};

/// Configuration for the jambcbt application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Base URL of the ALOC question bank API
    pub aloc_base_url: String,
    /// Access token for the ALOC question bank API
    pub aloc_access_token: Option<String>,
    /// API key for the Gemini provider
    pub gemini_api_key: Option<String>,
    /// API key for the Grok provider
    pub grok_api_key: Option<String>,
    /// API key for the Cerebras provider
    pub cerebras_api_key: Option<String>,
    /// Timeout for upstream HTTP requests in seconds
    pub http_timeout_secs: u64,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    /// Optional update for database URL
    #[serde(default)]
    pub database_url: Option<String>,
    /// Optional update for the bind address
    #[serde(default)]
    pub bind_address: Option<String>,
    /// Optional update for the port
    #[serde(default)]
    pub port: Option<u16>,
    /// Optional update for the ALOC base URL
    #[serde(default)]
    pub aloc_base_url: Option<String>,
    /// Optional update for the ALOC access token
    #[serde(default)]
    pub aloc_access_token: Option<String>,
    /// Optional update for the Gemini API key
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    /// Optional update for the Grok API key
    #[serde(default)]
    pub grok_api_key: Option<String>,
    /// Optional update for the Cerebras API key
    #[serde(default)]
    pub cerebras_api_key: Option<String>,
    /// Optional update for the upstream HTTP timeout
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
}

/// Command line arguments for the application
#[derive(Parser, Debug)]
#[clap(name = "jambcbt", about = "A JAMB CBT practice server")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to bind the server to
    #[clap(long, env = "BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Port to listen on
    #[clap(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the ALOC question bank API
    #[clap(long, env = "ALOC_BASE_URL")]
    pub aloc_base_url: Option<String>,

    /// Access token for the ALOC question bank API
    #[clap(long, env = "ALOC_ACCESS_TOKEN")]
    pub aloc_access_token: Option<String>,

    /// API key for the Gemini provider
    #[clap(long, env = "GEMINI_API_KEY")]
    pub gemini_api_key: Option<String>,

    /// API key for the Grok provider
    #[clap(long, env = "GROK_API_KEY")]
    pub grok_api_key: Option<String>,

    /// API key for the Cerebras provider
    #[clap(long, env = "CEREBRAS_API_KEY")]
    pub cerebras_api_key: Option<String>,

    /// Timeout for upstream HTTP requests in seconds
    #[clap(long, env = "HTTP_TIMEOUT_SECS")]
    pub http_timeout_secs: Option<u64>,

    /// Debug mode
    #[clap(long, env = "JAMBCBT_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            port: update.port.unwrap_or(self.port),
            aloc_base_url: update.aloc_base_url.unwrap_or(self.aloc_base_url),
            aloc_access_token: update.aloc_access_token.or(self.aloc_access_token),
            gemini_api_key: update.gemini_api_key.or(self.gemini_api_key),
            grok_api_key: update.grok_api_key.or(self.grok_api_key),
            cerebras_api_key: update.cerebras_api_key.or(self.cerebras_api_key),
            http_timeout_secs: update.http_timeout_secs.unwrap_or(self.http_timeout_secs),
        }
    }

    /// Returns the upstream HTTP timeout as a Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Whether any generative-AI provider key is configured
    pub fn has_ai_key(&self) -> bool {
        self.gemini_api_key.is_some()
            || self.grok_api_key.is_some()
            || self.cerebras_api_key.is_some()
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.map_or("jambcbt.db".to_string(), |path| {
        path.join("jambcbt.db").to_string_lossy().to_string()
    });

    Config {
        database_url,
        bind_address: "127.0.0.1".to_string(),
        port: 3001,
        aloc_base_url: "https://questions.aloc.com.ng/api/v2".to_string(),
        aloc_access_token: None,
        gemini_api_key: None,
        grok_api_key: None,
        cerebras_api_key: None,
        http_timeout_secs: 30,
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    // if the config path is None, return the default config
    if config_path.is_none() {
        return Ok(ConfigUpdate::default());
    }

    let config_path = config_path.unwrap();

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        bind_address: args.bind_address,
        port: args.port,
        aloc_base_url: args.aloc_base_url,
        aloc_access_token: args.aloc_access_token,
        gemini_api_key: args.gemini_api_key,
        grok_api_key: args.grok_api_key,
        cerebras_api_key: args.cerebras_api_key,
        http_timeout_secs: args.http_timeout_secs,
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let mut config_path = match ProjectDirs::from("ng", "jambcbt", "jambcbt") {
        Some(proj_dirs) => {
            let config_dir = proj_dirs.config_dir();
            let path = PathBuf::from(config_dir);
            Some(path)
        }
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    };

    config_path = config_path.and_then(|path| {
        if !path.exists() {
            info!("Config path not found at {:?}, using defaults", path);
            None
        } else {
            Some(path)
        }
    });

    let base = base_config(config_path.clone());

    // Apply updates in order of increasing precedence
    let config = base
        .apply_update(
            config_from_file(config_path.map(|path| path.join("config.toml"))).unwrap_or_default(),
        )
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, bind={}:{}, aloc_token={}, ai_keys={}",
        config.database_url,
        config.bind_address,
        config.port,
        config.aloc_access_token.is_some(),
        config.has_ai_key(),
    );

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::{TempDir, tempdir};

    /// Helper function to create a test configuration file
    fn create_test_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let config_path = dir.path().join("config.toml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        config_path
    }

    fn empty_args() -> CliArgs {
        CliArgs {
            database_url: None,
            bind_address: None,
            port: None,
            aloc_base_url: None,
            aloc_access_token: None,
            gemini_api_key: None,
            grok_api_key: None,
            cerebras_api_key: None,
            http_timeout_secs: None,
            debug: false,
        }
    }

    #[test]
    fn test_base_config_defaults() {
        let config = base_config(None);

        assert_eq!(config.database_url, "jambcbt.db");
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.port, 3001);
        assert_eq!(config.aloc_access_token, None);
        assert!(!config.has_ai_key());
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_base_config_with_path() {
        let temp_dir = tempdir().unwrap();
        let config = base_config(Some(temp_dir.path().to_path_buf()));

        let expected_db_path = temp_dir
            .path()
            .join("jambcbt.db")
            .to_string_lossy()
            .to_string();
        assert_eq!(config.database_url, expected_db_path);
    }

    #[test]
    fn test_apply_update_with_partial_values() {
        let config = base_config(None);

        let update = ConfigUpdate {
            port: Some(8080),
            aloc_access_token: Some("token".to_string()),
            ..ConfigUpdate::default()
        };

        let updated = config.apply_update(update);

        assert_eq!(updated.port, 8080);
        assert_eq!(updated.aloc_access_token, Some("token".to_string()));
        assert_eq!(updated.database_url, "jambcbt.db"); // Unchanged
        assert_eq!(updated.bind_address, "127.0.0.1"); // Unchanged
    }

    #[test]
    fn test_apply_update_keeps_existing_secrets() {
        let config = base_config(None).apply_update(ConfigUpdate {
            gemini_api_key: Some("key".to_string()),
            ..ConfigUpdate::default()
        });

        // a later layer with no key must not erase the earlier one
        let updated = config.apply_update(ConfigUpdate::default());

        assert_eq!(updated.gemini_api_key, Some("key".to_string()));
        assert!(updated.has_ai_key());
    }

    #[test]
    fn test_config_from_file_with_valid_toml() {
        let temp_dir = tempdir().unwrap();
        let config_content = r#"
            database_url = "file.db"
            port = 4000
            aloc_access_token = "ALOC-token"
        "#;

        let config_path = create_test_config_file(&temp_dir, config_content);

        let result = config_from_file(Some(config_path));

        assert!(
            result.is_ok(),
            "Failed to parse config file: {}",
            result.err().unwrap()
        );
        let update = result.unwrap();
        assert_eq!(update.database_url, Some("file.db".to_string()));
        assert_eq!(update.port, Some(4000));
        assert_eq!(update.aloc_access_token, Some("ALOC-token".to_string()));
        assert_eq!(update.gemini_api_key, None);
    }

    #[test]
    fn test_config_from_file_with_invalid_toml() {
        let temp_dir = tempdir().unwrap();
        let config_content = r#"
            port = "not a number"
        "#;

        let config_path = create_test_config_file(&temp_dir, config_content);

        let result = config_from_file(Some(config_path));

        assert!(result.is_err());
    }

    #[test]
    fn test_config_from_file_with_nonexistent_file() {
        let temp_dir = tempdir().unwrap();
        let nonexistent_path = temp_dir.path().join("nonexistent_config.toml");

        let result = config_from_file(Some(nonexistent_path));

        assert!(result.is_ok());
        let update = result.unwrap();
        assert_eq!(update.database_url, None);
    }

    #[test]
    fn test_precedence_args_over_file_over_base() {
        let args = CliArgs {
            database_url: Some("args.db".to_string()),
            ..empty_args()
        };

        let file_config = ConfigUpdate {
            database_url: Some("file.db".to_string()),
            port: Some(4000),
            ..ConfigUpdate::default()
        };

        let config = base_config(None)
            .apply_update(file_config)
            .apply_update(config_from_args(args));

        assert_eq!(config.database_url, "args.db"); // From args
        assert_eq!(config.port, 4000); // From file
        assert_eq!(config.bind_address, "127.0.0.1"); // From base
    }
}
