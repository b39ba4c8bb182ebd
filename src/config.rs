use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub trino: TrinoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrinoConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8081)?
            .set_default("trino.host", "localhost")?
            .set_default("trino.port", 8080)?
            .set_default("trino.user", "trino")?;

        // Load from environment variables
        if let Ok(host) = env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            builder = builder.set_override("server.port", port.parse::<u16>().unwrap_or(8081))?;
        }

        if let Ok(host) = env::var("TRINO_HOST") {
            builder = builder.set_override("trino.host", host)?;
        }

        if let Ok(port) = env::var("TRINO_PORT") {
            builder = builder.set_override("trino.port", port.parse::<u16>().unwrap_or(8080))?;
        }

        if let Ok(user) = env::var("TRINO_USER") {
            builder = builder.set_override("trino.user", user)?;
        }

        if let Ok(catalog) = env::var("TRINO_CATALOG") {
            builder = builder.set_override("trino.catalog", catalog)?;
        }

        if let Ok(schema) = env::var("TRINO_SCHEMA") {
            builder = builder.set_override("trino.schema", schema)?;
        }

        // Try to load from .env file
        let _ = dotenv::dotenv();

        builder.build()?.try_deserialize()
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl TrinoConfig {
    /// Base URL of the executor's HTTP statement endpoint.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
