//! store — хранилище именованных колоночных снапшотов.
//!
//! Раскладка: <root>/<table>/{table.col, manifest.json} плюс
//! <root>/store.lock (эксклюзивная advisory-блокировка на время записи).
//!
//! Контракт:
//! - write(table, t): атомарная замена снапшота целиком (tmp+rename,
//!   затем fsync родительского каталога; best-effort вне Unix).
//!   Последняя запись побеждает, версий не храним.
//! - read(table): чистое чтение последнего завершённого write.
//! - Один пишущий процесс на хранилище за прогон. Блокировка снимает
//!   гонки в пределах хоста, но это документированное ограничение,
//!   а не гарантия уровня формата.

use anyhow::{Context, Result};
use fs2::FileExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::consts::{COL_FILE, MANIFEST_FILE, STORE_LOCK_FILE};
use crate::errors::StoreError;
use crate::model::{records_to_table, Record};
use crate::table::codec::{decode_table, encode_table};
use crate::table::{ColumnType, Table};

pub struct SnapshotStore {
    root: PathBuf,
    lock_path: PathBuf,
}

/// Сайдкар manifest.json: человекочитаемое описание снапшота.
/// Для чтения данных не нужен, table.col самоописывающий.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableManifest {
    pub version: u32, // == 1
    pub table: String,
    pub rows: u64,
    pub columns: Vec<ManifestColumn>,
    pub file_bytes: u64,
    pub written_unix_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String, // "i64" | "f64" | "utf8"
}

impl SnapshotStore {
    /// Открыть или создать хранилище в каталоге root.
    pub fn open_or_create(root: &Path) -> Result<Self> {
        if !root.exists() {
            fs::create_dir_all(root).with_context(|| format!("create {}", root.display()))?;
        }
        Ok(Self {
            root: root.to_path_buf(),
            lock_path: root.join(STORE_LOCK_FILE),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Записать снапшот таблицы, атомарно заменив прежний.
    ///
    /// Пустая таблица поверх существующего снапшота — no-op (прежние
    /// данные остаются); пустая таблица без существующего снапшота —
    /// ошибка записи.
    pub fn write(&self, table: &str, t: &Table) -> Result<(), StoreError> {
        validate_table_name(table)?;

        let col_path = self.table_dir(table).join(COL_FILE);
        if t.rows() == 0 {
            if col_path.exists() {
                warn!(
                    "write '{}': empty input, keeping existing snapshot",
                    table
                );
                return Ok(());
            }
            return Err(StoreError::write(
                table,
                "empty input and no existing snapshot to fall back to",
            ));
        }

        let bytes = encode_table(t)
            .map_err(|e| StoreError::write(table, format!("encode: {:#}", e)))?;

        let _lk = self.lock_exclusive(table)?;

        let dir = self.table_dir(table);
        fs::create_dir_all(&dir)
            .map_err(|e| StoreError::write(table, format!("create {}: {}", dir.display(), e)))?;

        atomic_replace(&dir.join(COL_FILE), &bytes)
            .map_err(|e| StoreError::write(table, format!("{:#}", e)))?;

        let manifest = TableManifest {
            version: 1,
            table: table.to_string(),
            rows: t.rows() as u64,
            columns: t
                .columns()
                .iter()
                .map(|c| ManifestColumn {
                    name: c.name.clone(),
                    ty: type_name(c.data.column_type()).to_string(),
                })
                .collect(),
            file_bytes: bytes.len() as u64,
            written_unix_ms: now_ms(),
        };
        let json = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| StoreError::write(table, format!("manifest json: {}", e)))?;
        atomic_replace(&dir.join(MANIFEST_FILE), &json)
            .map_err(|e| StoreError::write(table, format!("{:#}", e)))?;

        info!(
            "snapshot '{}' written: {} rows, {} columns, {} B",
            table,
            t.rows(),
            t.columns().len(),
            bytes.len()
        );
        Ok(())
    }

    /// Удобный путь для типизированных записей.
    pub fn write_records<R: Record>(&self, table: &str, records: &[R]) -> Result<(), StoreError> {
        self.write(table, &records_to_table(records))
    }

    /// Прочитать текущий снапшот таблицы в память.
    pub fn read(&self, table: &str) -> Result<Table, StoreError> {
        validate_table_name(table)?;
        let path = self.table_dir(table).join(COL_FILE);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    table: table.to_string(),
                    path,
                });
            }
            Err(e) => {
                return Err(StoreError::corrupt(
                    table,
                    format!("read {}: {}", path.display(), e),
                ));
            }
        };
        let t = decode_table(&bytes)
            .map_err(|e| StoreError::corrupt(table, format!("{:#}", e)))?;
        debug!("snapshot '{}' read: {} rows", table, t.rows());
        Ok(t)
    }

    /// Прочитать сайдкар-манифест таблицы (для status).
    pub fn read_manifest(&self, table: &str) -> Result<TableManifest> {
        let path = self.table_dir(table).join(MANIFEST_FILE);
        let bytes =
            fs::read(&path).with_context(|| format!("read manifest {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("parse manifest {}", path.display()))
    }

    /// Имена таблиц, у которых есть снапшот (сортировано).
    pub fn tables(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let rd = fs::read_dir(&self.root)
            .with_context(|| format!("read dir {}", self.root.display()))?;
        for entry in rd {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if entry.path().join(COL_FILE).exists() {
                out.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        out.sort();
        Ok(out)
    }

    fn table_dir(&self, table: &str) -> PathBuf {
        self.root.join(table)
    }

    fn lock_exclusive(&self, table: &str) -> Result<File, StoreError> {
        let f = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| {
                StoreError::write(table, format!("open lock {}: {}", self.lock_path.display(), e))
            })?;
        f.lock_exclusive().map_err(|e| {
            StoreError::write(
                table,
                format!("lock_exclusive {}: {}", self.lock_path.display(), e),
            )
        })?;
        Ok(f)
    }
}

/// Имя таблицы — простой компонент пути: без разделителей, не пустое,
/// не начинается с точки (чтобы не пересекаться со служебными файлами).
fn validate_table_name(table: &str) -> Result<(), StoreError> {
    if table.is_empty() {
        return Err(StoreError::write(table, "empty table name"));
    }
    if table.starts_with('.') {
        return Err(StoreError::write(table, "table name starts with '.'"));
    }
    if table.chars().any(|c| c == '/' || c == '\\' || c == '\0') {
        return Err(StoreError::write(table, "table name contains path separators"));
    }
    Ok(())
}

/// Атомарная замена файла: tmp + sync + rename, затем fsync каталога.
fn atomic_replace(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    let _ = fs::remove_file(&tmp);
    {
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)
            .with_context(|| format!("open tmp {}", tmp.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("write {}", tmp.display()))?;
        f.sync_all()
            .with_context(|| format!("sync {}", tmp.display()))?;
    }
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    let _ = fsync_dir(path);
    Ok(())
}

#[cfg(unix)]
fn fsync_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
    }
    Ok(())
}
#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn type_name(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::I64 => "i64",
        ColumnType::F64 => "f64",
        ColumnType::Str => "utf8",
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
