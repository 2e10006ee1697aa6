//! Общие константы формата снапшотов и раскладки хранилища.

// -------- Snapshot file (table.col) --------
pub const COL_MAGIC: &[u8; 8] = b"COLSNAP1";
pub const COL_VERSION: u32 = 1;
pub const COL_FILE: &str = "table.col";

// Формат table.col (LE):
// [MAGIC8="COLSNAP1"][ver u32=1][column_count u32][row_count u64]
// далее column_count колонок:
//   [name_len u16][name bytes][type u8]
//   payload:
//     i64  -> row_count * 8
//     f64  -> row_count * 8 (IEEE 754 bits)
//     utf8 -> на значение: [len u32][bytes]
// [crc32 u32] -- crc32fast по всем байтам после MAGIC8

// Теги типов колонок:
pub const COL_TYPE_I64: u8 = 1;
pub const COL_TYPE_STR: u8 = 2;
pub const COL_TYPE_F64: u8 = 3;

// -------- Store layout --------
pub const MANIFEST_FILE: &str = "manifest.json";
pub const STORE_LOCK_FILE: &str = "store.lock";

// -------- Well-known tables --------
pub const TABLE_USERS: &str = "users";
pub const TABLE_POSTS: &str = "posts";
