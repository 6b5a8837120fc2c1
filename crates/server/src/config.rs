use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

const ENV_PREFIX: &str = "CAMPUSWORK_";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
    pub worker: WorkerSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    /// A sqlx SQLite URL, or `memory` for a non-persistent store.
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct SecuritySettings {
    /// Shared with the authentication provider that issues session tokens.
    pub session_secret: String,
}

#[derive(Deserialize, Clone)]
pub struct WorkerSettings {
    pub queue_size: usize,
    pub reply_timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::build(&run_mode, collect_env_vars(std::env::vars()))
    }

    fn build(run_mode: &str, env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let env_json = serde_json::to_string(&env_map)
            .map_err(|e| ConfigError::Message(format!("environment: {}", e)))?;

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("database.url", "sqlite://data/campuswork.db")?
            .set_default("security.session_secret", "change_me_please")?
            .set_default("worker.queue_size", 100)?
            .set_default("worker.reply_timeout_secs", 5)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(&env_json, config::FileFormat::Json))
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        if settings.worker.queue_size == 0 {
            return Err(ConfigError::Message(
                "worker.queue_size must be at least 1".to_string(),
            ));
        }
        Ok(settings)
    }
}

fn collect_env_vars(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}
