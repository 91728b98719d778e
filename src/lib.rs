//! Clinic front-desk service core library
//!
//! This module exports the domain model, the appointment filter engine,
//! the dashboard workflow, and the persistence and HTTP layers.

pub mod api;
pub mod core;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

/// Application configuration
pub mod config {
    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Config {
        #[serde(default)]
        pub server: ServerConfig,
        #[serde(default)]
        pub database: DatabaseConfig,
        #[serde(default)]
        pub cache: CacheConfig,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ServerConfig {
        #[serde(default = "default_host")]
        pub host: String,
        #[serde(default = "default_port")]
        pub port: u16,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct DatabaseConfig {
        #[serde(default = "default_database_url")]
        pub url: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CacheConfig {
        pub redis_url: Option<String>,
    }

    fn default_host() -> String {
        "127.0.0.1".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_database_url() -> String {
        "sqlite:frontdesk.db?mode=rwc".to_string()
    }

    impl Default for ServerConfig {
        fn default() -> Self {
            Self {
                host: default_host(),
                port: default_port(),
            }
        }
    }

    impl Default for DatabaseConfig {
        fn default() -> Self {
            Self {
                url: default_database_url(),
            }
        }
    }

    impl Default for CacheConfig {
        fn default() -> Self {
            Self { redis_url: None }
        }
    }

    /// Load configuration from files and environment.
    pub fn load() -> Result<Config, config::ConfigError> {
        let env = std::env::var("FRONTDESK_ENV").unwrap_or_else(|_| "development".into());

        config::Config::builder()
            // Start with default settings
            .add_source(config::File::with_name("config/default").required(false))
            // Override with environment-specific settings
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("FRONTDESK").separator("__"))
            .build()?
            .try_deserialize()
    }
}
