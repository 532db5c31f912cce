use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{Config, ConfigError};

/// Snapshots kept in the backup directory; older ones are pruned.
pub const MAX_CONFIG_BACKUPS: usize = 10;

const BACKUP_PREFIX: &str = "config_";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A saved copy of the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBackup {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Reads, validates and writes [`Config`], keeping timestamped snapshots.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups_dir,
        }
    }

    /// `<base>/config/config.json` with backups in `<base>/config/backups`.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        fs::create_dir_all(config_dir.join("backups"))?;
        Ok(Self::new(
            config_dir.join("config.json"),
            config_dir.join("backups"),
        ))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The stored configuration, or the defaults when none exists yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        match fs::read_to_string(&self.config_path) {
            Ok(raw) => read_config(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Validates and writes `config` through a temporary file.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        write_json(&self.config_path, config)
    }

    /// Loads, changes and saves the configuration in one step.
    ///
    /// The previous file is snapshotted first; nothing is written when
    /// `change` leaves an invalid configuration behind.
    pub fn update<F>(&self, change: F) -> Result<Config, ConfigError>
    where
        F: FnOnce(&mut Config) -> Result<(), ConfigError>,
    {
        let current = self.load()?;
        let mut next = current.clone();
        change(&mut next)?;
        next.validate()?;
        if next == current {
            return Ok(next);
        }
        if self.config_path.exists() {
            self.backup(&current, Some("before update"))?;
        }
        self.save(&next)?;
        Ok(next)
    }

    /// Writes a snapshot of `config` and returns its name.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, ConfigError> {
        let mut name = format!(
            "{BACKUP_PREFIX}{}",
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT)
        );
        if let Some(label) = note.and_then(slug) {
            name = format!("{name}_{label}");
        }
        name.push_str(".json");
        write_json(&self.backups_dir.join(&name), config)?;
        self.prune_backups()?;
        Ok(name)
    }

    /// Makes a snapshot the current configuration again.
    pub fn restore(&self, backup_name: &str) -> Result<Config, ConfigError> {
        let path = self.backups_dir.join(backup_name);
        if backup_name.contains(|c: char| c == '/' || c == '\\') || !path.is_file() {
            return Err(ConfigError::BackupNotFound(backup_name.to_string()));
        }
        let config = read_config(&fs::read_to_string(&path)?)?;
        self.save(&config)?;
        Ok(config)
    }

    /// Snapshots, newest first.
    pub fn list_backups(&self) -> Result<Vec<ConfigBackup>, ConfigError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name.starts_with(BACKUP_PREFIX) && name.ends_with(".json") {
                backups.push(ConfigBackup {
                    created_at: backup_timestamp(&name),
                    name,
                });
            }
        }
        backups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(backups)
    }

    fn prune_backups(&self) -> Result<(), ConfigError> {
        for stale in self.list_backups()?.into_iter().skip(MAX_CONFIG_BACKUPS) {
            fs::remove_file(self.backups_dir.join(&stale.name))?;
        }
        Ok(())
    }
}

fn read_config(raw: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(raw)?;
    config.validate()?;
    Ok(config)
}

fn write_json(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Lowercase ASCII slug of a backup note, `None` when nothing usable remains.
fn slug(note: &str) -> Option<String> {
    let mut out = String::new();
    for ch in note.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let out = out.trim_end_matches('-');
    (!out.is_empty()).then(|| out.to_string())
}

fn backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stamp = name.strip_prefix(BACKUP_PREFIX)?.get(..15)?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_become_slugs() {
        assert_eq!(slug("Pre Upgrade v2.1"), Some("pre-upgrade-v2-1".into()));
        assert_eq!(slug("  before update "), Some("before-update".into()));
        assert_eq!(slug("!!!"), None);
    }

    #[test]
    fn timestamps_follow_the_prefix() {
        let parsed = backup_timestamp("config_20250611_093015_manual.json").expect("timestamp");
        assert_eq!(parsed.format("%Y%m%d%H%M%S").to_string(), "20250611093015");
        assert!(backup_timestamp("notes.json").is_none());
    }
}
