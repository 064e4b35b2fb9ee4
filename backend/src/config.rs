//! Configuration management for the Farm Operations Metrics Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FARM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{Entity, DEFAULT_FETCH_LIMIT};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Source chains and fetch shape for the dashboard
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    /// Rows requested from each source per entity
    pub fetch_limit: u32,

    /// Candidate tables per entity, highest priority first
    pub sources: SourceChains,
}

/// Table names tried, in order, for each entity
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SourceChains {
    pub production: Vec<String>,
    pub quality: Vec<String>,
    pub sales: Vec<String>,
    pub fattening: Vec<String>,
    pub staffing: Vec<String>,
}

impl SourceChains {
    pub fn for_entity(&self, entity: Entity) -> &[String] {
        match entity {
            Entity::Production => &self.production,
            Entity::Quality => &self.quality,
            Entity::Sales => &self.sales,
            Entity::Fattening => &self.fattening,
            Entity::Staffing => &self.staffing,
        }
    }
}

fn chain(tables: &[&str]) -> Vec<String> {
    tables.iter().map(|t| t.to_string()).collect()
}

impl Default for SourceChains {
    fn default() -> Self {
        Self {
            production: chain(&["production_reports", "cheese_production", "coffee_processing"]),
            quality: chain(&["quality_checks", "milk_reception", "production_reports"]),
            sales: chain(&["sales_records", "export_orders"]),
            fattening: chain(&["cattle_fattening", "livestock_weighings"]),
            staffing: chain(&["staff_attendance", "shift_roster"]),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            fetch_limit: DEFAULT_FETCH_LIMIT,
            sources: SourceChains::default(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("FARM_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let defaults = SourceChains::default();

        let mut builder = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("metrics.fetch_limit", DEFAULT_FETCH_LIMIT)?;

        for entity in Entity::ALL {
            builder = builder.set_default(
                format!("metrics.sources.{}", entity),
                defaults.for_entity(entity).to_vec(),
            )?;
        }

        let mut env = Environment::with_prefix("FARM")
            .separator("__")
            .list_separator(",")
            .try_parsing(true);
        for entity in Entity::ALL {
            env = env.with_list_parse_key(&format!("metrics.sources.{}", entity));
        }

        let config = builder
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FARM__ prefix)
            .add_source(env)
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
