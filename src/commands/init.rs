//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub config_path: PathBuf,
    /// Overrides the default data directory written to the new config
    pub data_dir: Option<PathBuf>,
    pub force: bool,
}

/// What `init` created
#[derive(Debug, Clone, Serialize)]
pub struct InitReport {
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub overwritten: bool,
}

/// Write a default config file and create the data directory layout
pub fn cmd_init(options: InitOptions) -> Result<InitReport> {
    let InitOptions {
        config_path,
        data_dir,
        force,
    } = options;

    let overwritten = config_path.exists();
    if overwritten && !force {
        return Err(Error::Config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    let mut config = Config::default();
    if let Some(dir) = data_dir {
        config.storage.data_dir = dir;
    }
    config.validate()?;
    config.save(&config_path)?;

    std::fs::create_dir_all(config.raw_dir())?;
    std::fs::create_dir_all(config.parsed_dir())?;
    info!(data_dir = %config.storage.data_dir.display(), "Created data directories");

    Ok(InitReport {
        config_path,
        data_dir: config.storage.data_dir,
        overwritten,
    })
}

pub fn print_init(report: &InitReport) {
    println!("\n✓ earnings-agent initialized\n");
    println!("Configuration: {}", report.config_path.display());
    println!("Data directory: {}", report.data_dir.display());
    if report.overwritten {
        println!("(existing config was overwritten)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_config_and_layout() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        let data_dir = tmp.path().join("data");

        let report = cmd_init(InitOptions {
            config_path: config_path.clone(),
            data_dir: Some(data_dir.clone()),
            force: false,
        })
        .unwrap();

        assert!(!report.overwritten);
        assert!(data_dir.join("raw").is_dir());
        assert!(data_dir.join("parsed").is_dir());

        let loaded = Config::load(&config_path).unwrap();
        assert_eq!(loaded.storage.data_dir, data_dir);
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[retry]\nmax_attempts = 7\n").unwrap();

        let options = InitOptions {
            config_path: config_path.clone(),
            data_dir: Some(tmp.path().join("data")),
            force: false,
        };
        assert!(matches!(cmd_init(options.clone()), Err(Error::Config(_))));

        let report = cmd_init(InitOptions {
            force: true,
            ..options
        })
        .unwrap();
        assert!(report.overwritten);
        assert_eq!(Config::load(&config_path).unwrap().retry.max_attempts, 3);
    }
}
