use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, NaiveDateTime, Utc};
use turbocash_core::{
    storage::{load_document, LoadedDocument, UserStore},
    Clock, CoreError, CoreResult, SystemClock,
};
use turbocash_domain::UserData;

const DOCUMENT_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// Directory layout used by [`JsonUserStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub users_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// `<root>/users` for documents and `<root>/backups` for snapshots.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            users_root: root.join("users"),
            backup_root: root.join("backups"),
        }
    }
}

/// Describes a persisted backup of a user document.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub user: String,
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

/// Size and freshness of a stored document.
#[derive(Debug, Clone)]
pub struct StorageInfo {
    pub path: PathBuf,
    pub exists: bool,
    pub size_bytes: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub backup_count: usize,
}

/// Filesystem-backed JSON persistence with one document per user.
#[derive(Clone)]
pub struct JsonUserStore {
    paths: StoragePaths,
    retention: usize,
    clock: Arc<dyn Clock>,
}

impl JsonUserStore {
    pub fn new(paths: StoragePaths) -> CoreResult<Self> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> CoreResult<Self> {
        fs::create_dir_all(&paths.users_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            paths,
            retention: retention.max(1),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the clock used for backup names and legacy migrations.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn document_path(&self, user_id: &str) -> PathBuf {
        self.paths
            .users_root
            .join(format!("{}.{}", canonical_name(user_id), DOCUMENT_EXTENSION))
    }

    /// Loads a document together with the repairs applied while reading it.
    pub fn load_document(&self, user_id: &str) -> CoreResult<Option<LoadedDocument>> {
        let path = self.document_path(user_id);
        if !path.exists() {
            tracing::debug!(user = %user_id, "no stored document");
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        let loaded = load_document(&raw, self.clock.today())?;
        if !loaded.migrations.is_empty() {
            tracing::info!(
                user = %user_id,
                migrations = loaded.migrations.len(),
                "stored document upgraded on load"
            );
        }
        Ok(Some(loaded))
    }

    /// Snapshots the current document under an optional note.
    pub fn backup(&self, user_id: &str, note: Option<&str>) -> CoreResult<BackupInfo> {
        let source = self.document_path(user_id);
        if !source.exists() {
            return Err(CoreError::not_found("user document", user_id));
        }
        let mut stem = format!("{}_{}", canonical_name(user_id), self.timestamp());
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let path = self.free_backup_path(user_id, &stem);
        copy_into(&source, &path)?;
        self.prune_backups(user_id)?;
        tracing::info!(user = %user_id, backup = %path.display(), "backup created");
        Ok(self.describe_backup(user_id, &path))
    }

    /// Backups of a user, newest first.
    pub fn list_backups(&self, user_id: &str) -> CoreResult<Vec<BackupInfo>> {
        let dir = self.backup_dir(user_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            entries.push(self.describe_backup(user_id, &path));
        }
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entries)
    }

    /// Replaces the live document with a backup and returns the restored data.
    ///
    /// The document being replaced is itself backed up first.
    pub fn restore_backup(&self, user_id: &str, backup_id: &str) -> CoreResult<UserData> {
        if backup_id.contains(|c: char| c == '/' || c == '\\') || backup_id.starts_with('.') {
            return Err(CoreError::InvalidOperation(format!(
                "invalid backup name `{backup_id}`"
            )));
        }
        let source = self.backup_dir(user_id).join(backup_id);
        if !source.exists() {
            return Err(CoreError::Storage(format!("backup `{backup_id}` not found")));
        }
        let raw = fs::read_to_string(&source)?;
        let loaded = load_document(&raw, self.clock.today())?;
        self.save(user_id, &loaded.data)?;
        tracing::info!(user = %user_id, backup = %backup_id, "backup restored");
        Ok(loaded.data)
    }

    /// Pretty JSON of the stored document.
    pub fn export_user(&self, user_id: &str) -> CoreResult<String> {
        let loaded = self
            .load_document(user_id)?
            .ok_or_else(|| CoreError::not_found("user document", user_id))?;
        serialize_document(&loaded.data)
    }

    /// Parses, upgrades and stores an exported document.
    pub fn import_user(&self, user_id: &str, json: &str) -> CoreResult<LoadedDocument> {
        let loaded = load_document(json, self.clock.today())?;
        self.save(user_id, &loaded.data)?;
        tracing::info!(
            user = %user_id,
            transactions = loaded.data.transactions.len(),
            budgets = loaded.data.budgets.len(),
            "user document imported"
        );
        Ok(loaded)
    }

    pub fn storage_info(&self, user_id: &str) -> CoreResult<StorageInfo> {
        let path = self.document_path(user_id);
        let backup_count = self.list_backups(user_id)?.len();
        match fs::metadata(&path) {
            Ok(meta) => Ok(StorageInfo {
                size_bytes: meta.len(),
                last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
                exists: true,
                path,
                backup_count,
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StorageInfo {
                path,
                exists: false,
                size_bytes: 0,
                last_modified: None,
                backup_count,
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn backup_dir(&self, user_id: &str) -> PathBuf {
        self.paths.backup_root.join(canonical_name(user_id))
    }

    fn timestamp(&self) -> String {
        self.clock.now().format(BACKUP_TIMESTAMP_FORMAT).to_string()
    }

    /// `<stem>.json`, or `<stem>_NN.json` when snapshots share a second.
    fn free_backup_path(&self, user_id: &str, stem: &str) -> PathBuf {
        let dir = self.backup_dir(user_id);
        let first = dir.join(format!("{stem}.{DOCUMENT_EXTENSION}"));
        if !first.exists() {
            return first;
        }
        (2u32..)
            .map(|n| dir.join(format!("{stem}_{n:02}.{DOCUMENT_EXTENSION}")))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }

    fn describe_backup(&self, user_id: &str, path: &Path) -> BackupInfo {
        let id = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        let size_bytes = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
        let slug = canonical_name(user_id);
        BackupInfo {
            created_at: parse_backup_timestamp(&slug, &id),
            user: slug,
            id,
            size_bytes,
            path: path.to_path_buf(),
        }
    }

    fn backup_existing_file(&self, user_id: &str, path: &Path) -> CoreResult<()> {
        if !path.exists() {
            return Ok(());
        }
        let stem = format!("{}_{}", canonical_name(user_id), self.timestamp());
        copy_into(path, &self.free_backup_path(user_id, &stem))?;
        self.prune_backups(user_id)
    }

    fn prune_backups(&self, user_id: &str) -> CoreResult<()> {
        for stale in self.list_backups(user_id)?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&stale.path) {
                tracing::warn!(backup = %stale.id, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl UserStore for JsonUserStore {
    fn load(&self, user_id: &str) -> CoreResult<Option<UserData>> {
        Ok(self.load_document(user_id)?.map(|loaded| loaded.data))
    }

    fn save(&self, user_id: &str, data: &UserData) -> CoreResult<()> {
        let path = self.document_path(user_id);
        self.backup_existing_file(user_id, &path)?;
        save_document_to_path(data, &path)?;
        tracing::info!(user = %user_id, path = %path.display(), "user document saved");
        Ok(())
    }

    fn delete(&self, user_id: &str) -> CoreResult<bool> {
        let path = self.document_path(user_id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        tracing::info!(user = %user_id, "user document deleted");
        Ok(true)
    }

    fn list_users(&self) -> CoreResult<Vec<String>> {
        if !self.paths.users_root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.paths.users_root)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Writes a document to an arbitrary path through a temporary file.
pub fn save_document_to_path(data: &UserData, path: &Path) -> CoreResult<()> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_document(data)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// File-name-safe slug of a user id.
pub fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches(|c: char| c == '_' || c == '-').is_empty() {
        "user".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Reads `YYYYmmdd_HHMMSS` right after the `<slug>_` prefix of a backup name.
fn parse_backup_timestamp(slug: &str, file_name: &str) -> Option<DateTime<Utc>> {
    let rest = file_name.strip_prefix(slug)?.strip_prefix('_')?;
    let stamp = rest.get(..15)?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn copy_into(source: &Path, target: &Path) -> CoreResult<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, target)?;
    Ok(())
}

fn write_atomic(path: &Path, data: &str) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn serialize_document(data: &UserData) -> CoreResult<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_file_name_safe() {
        assert_eq!(canonical_name("demo_user"), "demo_user");
        assert_eq!(canonical_name(" Asha.Rao@Mail "), "asha_rao_mail");
        assert_eq!(canonical_name("../../etc"), "______etc");
        assert_eq!(canonical_name("***"), "user");
    }

    #[test]
    fn backup_notes_are_slugged() {
        assert_eq!(sanitize_backup_note(Some(" Before Import! ")), Some("before-import".into()));
        assert_eq!(sanitize_backup_note(Some("   ")), None);
        assert_eq!(sanitize_backup_note(None), None);
    }

    #[test]
    fn timestamps_parse_after_slug_prefix() {
        let parsed = parse_backup_timestamp("demo_user", "demo_user_20250611_093015_manual.json")
            .expect("timestamp");
        assert_eq!(parsed.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-06-11 09:30:15");
        let repeated = parse_backup_timestamp("demo_user", "demo_user_20250611_093015_02.json");
        assert_eq!(repeated, Some(parsed));
        assert!(parse_backup_timestamp("demo_user", "other_20250611_093015.json").is_none());
    }
}
