use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    /// Path of the single local slot holding the serialized progress record.
    pub progress_path: String,
    /// Absent key means the speech coach runs in fallback-only mode.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub sync_api_url: String,
    pub sync_api_key: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        let progress_path = settings
            .get_string("storage.progress_path")
            .or_else(|_| env::var("PROGRESS_STORAGE_PATH"))
            .unwrap_or_else(|_| "data/progress.json".to_string());

        let openai_api_key = settings
            .get_string("openai.api_key")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());

        if openai_api_key.is_none() {
            eprintln!("WARNING: OPENAI_API_KEY not set - speech feedback runs in fallback mode");
        }

        let openai_base_url = settings
            .get_string("openai.base_url")
            .or_else(|_| env::var("OPENAI_BASE_URL"))
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let sync_api_url = settings
            .get_string("sync.api_url")
            .or_else(|_| env::var("SYNC_API_URL"))
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        let sync_api_key = settings
            .get_string("sync.api_key")
            .or_else(|_| env::var("SYNC_API_KEY"))
            .unwrap_or_else(|_| {
                if env == "prod" {
                    panic!("FATAL: SYNC_API_KEY must be set in production!");
                }
                eprintln!("WARNING: Using empty SYNC_API_KEY (dev mode only!)");
                String::new()
            });

        Ok(Config {
            bind_addr,
            progress_path,
            openai_api_key,
            openai_base_url,
            sync_api_url,
            sync_api_key,
        })
    }
}
