//! Таксономия ошибок хранилища и сигналов качества данных.
//!
//! StoreError — фатально для вызвавшей операции, наружу уходит без
//! подмены (упавшая запись никогда не маскируется под успех).
//! DataQuality — не ошибка: легитимно пустые данные дают корректный
//! пустой результат, сигнал логируется и возвращается вызывающему.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Запись снапшота не удалась (имя таблицы, причина).
    #[error("write snapshot '{table}': {reason}")]
    Write { table: String, reason: String },

    /// Снапшота с таким именем нет.
    #[error("snapshot '{table}' not found at {}", .path.display())]
    NotFound { table: String, path: PathBuf },

    /// Снапшот на диске не разбирается в ожидаемую колоночную раскладку.
    #[error("snapshot '{table}' is corrupt: {reason}")]
    Corrupt { table: String, reason: String },
}

impl StoreError {
    pub fn write(table: &str, reason: impl Into<String>) -> Self {
        StoreError::Write {
            table: table.to_string(),
            reason: reason.into(),
        }
    }

    pub fn corrupt(table: &str, reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            table: table.to_string(),
            reason: reason.into(),
        }
    }
}

/// Нефатальные сигналы агрегации (пустые входы, пустой join).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataQuality {
    /// Исходная таблица пуста; запросы по ней дают пустой результат.
    EmptyInput { table: String },
    /// Обе стороны непусты, но join не дал ни одной строки.
    JoinKeyMismatch { query: String },
}

impl fmt::Display for DataQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQuality::EmptyInput { table } => {
                write!(f, "input table '{}' is empty", table)
            }
            DataQuality::JoinKeyMismatch { query } => {
                write!(f, "query '{}': join produced no rows", query)
            }
        }
    }
}
