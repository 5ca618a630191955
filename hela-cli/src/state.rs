use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// `$HELA_HOME`, or `~/.hela`
pub fn hela_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("HELA_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set (or set HELA_HOME)")?;
    Ok(PathBuf::from(home).join(".hela"))
}

pub fn ensure_hela_home() -> Result<PathBuf> {
    let dir = hela_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Profile {
    pub created_at_utc: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "Africa/Nairobi".to_string()
}

pub fn profile_path() -> Result<PathBuf> {
    Ok(ensure_hela_home()?.join("profile.json"))
}

pub fn write_profile(profile: &Profile) -> Result<()> {
    let p = profile_path()?;
    let json = serde_json::to_string_pretty(profile)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn read_profile() -> Result<Option<Profile>> {
    let p = profile_path()?;
    if !p.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(Some(serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))?))
}

/// Read a message from stdin when it was not passed as an argument
pub fn read_stdin() -> Result<String> {
    use std::io::Read;
    let mut s = String::new();
    std::io::stdin()
        .read_to_string(&mut s)
        .context("read message from stdin")?;
    Ok(s)
}
