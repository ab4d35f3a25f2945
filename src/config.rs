//! Runtime configuration read from the environment
//!
//! Call `dotenvy::dotenv()` first if a `.env` file should be honored.

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Server settings
///
/// | Variable       | Default          |
/// |----------------|------------------|
/// | `PORT`         | `4000`           |
/// | `DATABASE_URL` | `recipes.db`     |
/// | `PUBLIC_DIR`   | `public`         |
/// | `UPLOAD_DIR`   | `public/uploads` |
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub public_dir: PathBuf,
    pub upload_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("PORT", "4000")?,
            database_url: try_load("DATABASE_URL", "recipes.db")?,
            public_dir: try_load("PUBLIC_DIR", "public")?,
            upload_dir: try_load("UPLOAD_DIR", "public/uploads")?,
        })
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e: T::Err| ConfigError {
        key,
        reason: e.to_string(),
        value: raw.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_value_reports_key() {
        env::set_var("RECIPEBOOK_TEST_BAD_PORT", "not-a-port");
        let err = try_load::<u16>("RECIPEBOOK_TEST_BAD_PORT", "4000").unwrap_err();
        assert_eq!(err.key, "RECIPEBOOK_TEST_BAD_PORT");
        assert_eq!(err.value, "not-a-port");
        env::remove_var("RECIPEBOOK_TEST_BAD_PORT");
    }

    #[test]
    fn default_is_used_for_missing_variable() {
        let dir: PathBuf = try_load("RECIPEBOOK_TEST_UNSET_DIR", "public").unwrap();
        assert_eq!(dir, PathBuf::from("public"));
    }
}
