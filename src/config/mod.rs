// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};

/// Load configuration from environment variables
pub fn load_config() -> Result<AppConfig> {
    let loaded = config::Config::builder()
        .add_source(config::Environment::default().try_parsing(true))
        .build()
        .context("Failed to read environment")?;

    let app: AppConfig = loaded
        .try_deserialize()
        .context("Failed to parse environment configuration")?;

    app.validate()?;
    Ok(app)
}
