//! Service Configuration
//!
//! Every option can be given on the command line or through its
//! environment variable. Read once at process start.

use clap::Parser;

use crate::store::mongo::MongoSettings;

/// Gear catalog service configuration
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "gear-crud")]
#[command(version, about, long_about = None)]
pub struct GearConfig {
    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Log filter directive (e.g. `trace`, `info`, `gear_crud=debug`)
    #[arg(long, env = "LOG_LEVEL", default_value = "trace")]
    pub log_level: String,

    /// Database holding the gear collections
    #[arg(long, env = "GEAR_DATABASE", default_value = "gear")]
    pub gear_database: String,

    #[arg(long, env = "ARMOR_COLLECTION", default_value = "armor")]
    pub armor_collection: String,

    #[arg(long, env = "WEAPON_COLLECTION", default_value = "weapons")]
    pub weapon_collection: String,

    /// MongoDB connection string
    #[arg(long, env = "LOCAL_MONGO", default_value = "mongodb://localhost:27017")]
    pub mongo_uri: String,
}

impl Default for GearConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "trace".to_string(),
            gear_database: "gear".to_string(),
            armor_collection: "armor".to_string(),
            weapon_collection: "weapons".to_string(),
            mongo_uri: "mongodb://localhost:27017".to_string(),
        }
    }
}

impl GearConfig {
    /// Parse command line arguments and environment
    pub fn parse_args() -> Self {
        GearConfig::parse()
    }

    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connection settings for the MongoDB store
    pub fn mongo_settings(&self) -> MongoSettings {
        MongoSettings {
            uri: self.mongo_uri.clone(),
            database: self.gear_database.clone(),
            armor_collection: self.armor_collection.clone(),
            weapon_collection: self.weapon_collection.clone(),
        }
    }
}
