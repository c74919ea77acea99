use std::path::PathBuf;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::models::{Session, UserType};

/// Configuration for the application
#[derive(Debug)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,
    /// Directory receiving uploaded receipts
    pub upload_dir: PathBuf,
    pub log_file: PathBuf,
    pub session: Session,
}

#[derive(Debug, Deserialize)]
struct DatabaseEnv {
    database_url: String,
}

// Variables read with the BILLED_ prefix
#[derive(Debug, Deserialize)]
struct BilledEnv {
    user_email: Option<String>,
    #[serde(default)]
    user_type: UserType,
    #[serde(default = "default_upload_dir")]
    upload_dir: PathBuf,
    #[serde(default = "default_log_file")]
    log_file: PathBuf,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("billed.log")
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `email_override` wins over `BILLED_USER_EMAIL`.
    pub fn load(email_override: Option<String>) -> Result<Self> {
        let database = envy::from_env::<DatabaseEnv>().context("DATABASE_URL must be set")?;
        let billed = envy::prefixed("BILLED_").from_env::<BilledEnv>()?;

        let email = email_override
            .or(billed.user_email)
            .filter(|e| !e.trim().is_empty())
            .context("BILLED_USER_EMAIL must be set (or pass --email)")?;

        Ok(Self {
            database_url: database.database_url,
            upload_dir: billed.upload_dir,
            log_file: billed.log_file,
            session: Session {
                user_type: billed.user_type,
                email,
            },
        })
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Load the .env file and the configuration
pub fn init(email_override: Option<String>) -> Result<Config> {
    dotenv().ok();

    Config::load(email_override)
}
