//! In-memory columnar table.
//!
//! A `Table` is a set of named, equal-length columns of one of three
//! physical types (i64, f64, utf8). Construction validates that the
//! columns are rectangular; everything downstream may rely on it.

use anyhow::{anyhow, Result};

pub mod codec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    I64,
    F64,
    Str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    I64(Vec<i64>),
    F64(Vec<f64>),
    Str(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::I64(v) => v.len(),
            ColumnData::F64(v) => v.len(),
            ColumnData::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::I64(_) => ColumnType::I64,
            ColumnData::F64(_) => ColumnType::F64,
            ColumnData::Str(_) => ColumnType::Str,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Прямоугольная колоночная таблица (все колонки одной длины).
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Собрать таблицу из готовых колонок. Ошибка, если колонки разной
    /// длины или имена повторяются (гетерогенная форма).
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        for c in &columns {
            if c.data.len() != rows {
                return Err(anyhow!(
                    "ragged columns: '{}' has {} rows, expected {}",
                    c.name,
                    c.data.len(),
                    rows
                ));
            }
        }
        for (i, c) in columns.iter().enumerate() {
            if columns[..i].iter().any(|p| p.name == c.name) {
                return Err(anyhow!("duplicate column name '{}'", c.name));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Таблица из билдеров (по построению прямоугольная).
    pub fn from_builders(builders: Vec<ColumnBuilder>) -> Self {
        let rows = builders.first().map(|b| b.len()).unwrap_or(0);
        debug_assert!(builders.iter().all(|b| b.len() == rows));
        let columns = builders.into_iter().map(ColumnBuilder::finish).collect();
        Self { columns, rows }
    }

    /// Пустая таблица с заданной схемой (корректные имена/типы, 0 строк).
    pub fn empty(schema: &[(&str, ColumnType)]) -> Self {
        let columns = schema
            .iter()
            .map(|(name, ty)| ColumnBuilder::new(name, *ty).finish())
            .collect();
        Self { columns, rows: 0 }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Колонка i64 по имени (ошибка, если нет или другой тип).
    pub fn i64_col(&self, name: &str) -> Result<&[i64]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::I64(v)) => Ok(v),
            Some(_) => Err(anyhow!("column '{}' is not i64", name)),
            None => Err(anyhow!("no column '{}'", name)),
        }
    }

    pub fn f64_col(&self, name: &str) -> Result<&[f64]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::F64(v)) => Ok(v),
            Some(_) => Err(anyhow!("column '{}' is not f64", name)),
            None => Err(anyhow!("no column '{}'", name)),
        }
    }

    pub fn str_col(&self, name: &str) -> Result<&[String]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::Str(v)) => Ok(v),
            Some(_) => Err(anyhow!("column '{}' is not utf8", name)),
            None => Err(anyhow!("no column '{}'", name)),
        }
    }
}

/// Поколоночный аккумулятор при сборке таблицы из записей.
#[derive(Debug)]
pub struct ColumnBuilder {
    name: String,
    data: ColumnData,
}

impl ColumnBuilder {
    pub fn new(name: &str, ty: ColumnType) -> Self {
        let data = match ty {
            ColumnType::I64 => ColumnData::I64(Vec::new()),
            ColumnType::F64 => ColumnData::F64(Vec::new()),
            ColumnType::Str => ColumnData::Str(Vec::new()),
        };
        Self {
            name: name.to_string(),
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// push_* паникуют на несоответствии типа: схема статична и задаётся
    /// тем же кодом, который кладёт значения.
    pub fn push_i64(&mut self, v: i64) {
        match &mut self.data {
            ColumnData::I64(vec) => vec.push(v),
            _ => unreachable!("push_i64 into non-i64 column '{}'", self.name),
        }
    }

    pub fn push_f64(&mut self, v: f64) {
        match &mut self.data {
            ColumnData::F64(vec) => vec.push(v),
            _ => unreachable!("push_f64 into non-f64 column '{}'", self.name),
        }
    }

    pub fn push_str(&mut self, v: &str) {
        match &mut self.data {
            ColumnData::Str(vec) => vec.push(v.to_string()),
            _ => unreachable!("push_str into non-utf8 column '{}'", self.name),
        }
    }

    pub fn finish(self) -> Column {
        Column {
            name: self.name,
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_columns_rejected() {
        let cols = vec![
            Column {
                name: "a".into(),
                data: ColumnData::I64(vec![1, 2]),
            },
            Column {
                name: "b".into(),
                data: ColumnData::Str(vec!["x".into()]),
            },
        ];
        assert!(Table::new(cols).is_err());
    }

    #[test]
    fn duplicate_names_rejected() {
        let cols = vec![
            Column {
                name: "a".into(),
                data: ColumnData::I64(vec![1]),
            },
            Column {
                name: "a".into(),
                data: ColumnData::I64(vec![2]),
            },
        ];
        assert!(Table::new(cols).is_err());
    }

    #[test]
    fn typed_accessors() {
        let t = Table::new(vec![
            Column {
                name: "id".into(),
                data: ColumnData::I64(vec![7]),
            },
            Column {
                name: "name".into(),
                data: ColumnData::Str(vec!["seven".into()]),
            },
        ])
        .unwrap();
        assert_eq!(t.rows(), 1);
        assert_eq!(t.i64_col("id").unwrap(), &[7]);
        assert_eq!(t.str_col("name").unwrap()[0], "seven");
        assert!(t.i64_col("name").is_err());
        assert!(t.str_col("missing").is_err());
    }
}
