// Базовые модули
pub mod consts;
pub mod errors;
pub mod config;

// Модель записей (типизированная граница: валидация до входа в ядро)
pub mod model;

// Колонoчное представление и кодек снапшот-файла
pub mod table; // src/table/{mod,codec}.rs

// Хранилище снапшотов (каталог на таблицу, tmp+rename)
pub mod store; // src/store/mod.rs

// Агрегации: три независимых запроса поверх снапшотов
pub mod agg; // src/agg/mod.rs

// Загрузка исходных данных (HTTP, вне ядра)
pub mod fetch;

// Удобные реэкспорты
pub use agg::{analyze, Analysis};
pub use errors::{DataQuality, StoreError};
pub use model::{Post, Record, User};
pub use store::SnapshotStore;
pub use table::{Column, ColumnData, Table};
