use anyhow::{Context, Result};
use hela_ingest::ParserConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_hela_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user: UserSection,
    pub parser: ParserConfig,
    pub display: DisplaySection,
    pub storage: StorageSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSection {
    /// Owner key for every stored record
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Currency code shown next to amounts
    pub currency: String,
    /// IANA timezone used to decide "today"
    pub timezone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Defaults to <hela home>/data
    pub data_dir: Option<PathBuf>,
}

impl Default for UserSection {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            display_name: String::new(),
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            currency: "KES".to_string(),
            timezone: "Africa/Nairobi".to_string(),
        }
    }
}

impl Config {
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(ensure_hela_home()?.join("data")),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_hela_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config()?;
    if p.exists() {
        println!("# {}", p.display());
    } else {
        println!("# {} (not written yet, showing defaults)", p.display());
    }
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hela_ingest::Direction;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg = parse_config(
            r#"
[user]
id = "amina"

[parser]
default_direction = "incoming"
"#,
        )
        .unwrap();

        assert_eq!(cfg.user.id, "amina");
        assert_eq!(cfg.parser.default_direction, Direction::Incoming);
        assert_eq!(cfg.parser.currency_marker, "ksh");
        assert_eq!(cfg.display.timezone, "Africa/Nairobi");
        assert_eq!(cfg.storage.data_dir, None);
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(parse_config(&s).unwrap(), cfg);
    }

    #[test]
    fn test_unknown_direction_is_an_error() {
        assert!(parse_config("[parser]\ndefault_direction = \"sideways\"\n").is_err());
    }
}
