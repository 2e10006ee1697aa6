//! Typed record boundary.
//!
//! The fetch/validation side produces fully typed records; nothing past
//! this module re-checks field presence or types. Wire names follow the
//! upstream JSON source (`userId`), serde renames map them here.

use serde::{Deserialize, Serialize};

use crate::table::{ColumnBuilder, ColumnType, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub title: String,
    pub body: String,
}

/// Отображение типизированной записи в колоночную схему.
pub trait Record {
    /// Имена и типы колонок (порядок фиксирован).
    const SCHEMA: &'static [(&'static str, ColumnType)];

    /// Дописать поля записи в билдеры колонок (по одному на колонку,
    /// в порядке SCHEMA).
    fn append_to(&self, cols: &mut [ColumnBuilder]);
}

impl Record for User {
    const SCHEMA: &'static [(&'static str, ColumnType)] = &[
        ("id", ColumnType::I64),
        ("name", ColumnType::Str),
        ("username", ColumnType::Str),
        ("email", ColumnType::Str),
    ];

    fn append_to(&self, cols: &mut [ColumnBuilder]) {
        cols[0].push_i64(self.id);
        cols[1].push_str(&self.name);
        cols[2].push_str(&self.username);
        cols[3].push_str(&self.email);
    }
}

impl Record for Post {
    const SCHEMA: &'static [(&'static str, ColumnType)] = &[
        ("id", ColumnType::I64),
        ("userId", ColumnType::I64),
        ("title", ColumnType::Str),
        ("body", ColumnType::Str),
    ];

    fn append_to(&self, cols: &mut [ColumnBuilder]) {
        cols[0].push_i64(self.id);
        cols[1].push_i64(self.user_id);
        cols[2].push_str(&self.title);
        cols[3].push_str(&self.body);
    }
}

/// Собрать колоночную таблицу из последовательности записей одного типа.
pub fn records_to_table<R: Record>(records: &[R]) -> Table {
    let mut builders: Vec<ColumnBuilder> = R::SCHEMA
        .iter()
        .map(|(name, ty)| ColumnBuilder::new(name, *ty))
        .collect();
    for r in records {
        r.append_to(&mut builders);
    }
    Table::from_builders(builders)
}
