//! Кодек снапшот-файла table.col.
//!
//! Формат (LE) описан в consts.rs: самоописывающий заголовок
//! (имена/типы колонок, row_count), payload поколоночно, в хвосте
//! crc32 по всем байтам после магии. Decode строгий: любая
//! неожиданность (магия, версия, тег типа, обрыв, CRC, не-UTF8)
//! отдаёт ошибку с причиной, вызывающий мапит её в Corrupt.

use anyhow::{anyhow, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};

use crate::consts::{COL_MAGIC, COL_TYPE_F64, COL_TYPE_I64, COL_TYPE_STR, COL_VERSION};
use crate::table::{Column, ColumnData, Table};

/// Сериализовать таблицу в байты table.col.
pub fn encode_table(t: &Table) -> Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();
    buf.write_all(COL_MAGIC)?;
    buf.write_u32::<LittleEndian>(COL_VERSION)?;
    buf.write_u32::<LittleEndian>(t.columns().len() as u32)?;
    buf.write_u64::<LittleEndian>(t.rows() as u64)?;

    for col in t.columns() {
        let name = col.name.as_bytes();
        if name.len() > u16::MAX as usize {
            return Err(anyhow!("column name too long ({} bytes)", name.len()));
        }
        buf.write_u16::<LittleEndian>(name.len() as u16)?;
        buf.write_all(name)?;
        match &col.data {
            ColumnData::I64(vals) => {
                buf.write_u8(COL_TYPE_I64)?;
                for v in vals {
                    buf.write_i64::<LittleEndian>(*v)?;
                }
            }
            ColumnData::F64(vals) => {
                buf.write_u8(COL_TYPE_F64)?;
                for v in vals {
                    buf.write_u64::<LittleEndian>(v.to_bits())?;
                }
            }
            ColumnData::Str(vals) => {
                buf.write_u8(COL_TYPE_STR)?;
                for v in vals {
                    let b = v.as_bytes();
                    if b.len() > u32::MAX as usize {
                        return Err(anyhow!("string value too long ({} bytes)", b.len()));
                    }
                    buf.write_u32::<LittleEndian>(b.len() as u32)?;
                    buf.write_all(b)?;
                }
            }
        }
    }

    let crc = crc32(&buf[COL_MAGIC.len()..]);
    buf.write_u32::<LittleEndian>(crc)?;
    Ok(buf)
}

/// Разобрать байты table.col в таблицу.
pub fn decode_table(bytes: &[u8]) -> Result<Table> {
    // магия + минимальный заголовок + crc
    let min = COL_MAGIC.len() + 4 + 4 + 8 + 4;
    if bytes.len() < min {
        return Err(anyhow!("file too short ({} bytes)", bytes.len()));
    }
    if &bytes[..COL_MAGIC.len()] != COL_MAGIC {
        return Err(anyhow!("bad magic"));
    }

    let body = &bytes[COL_MAGIC.len()..bytes.len() - 4];
    let stored_crc = {
        let mut tail = &bytes[bytes.len() - 4..];
        tail.read_u32::<LittleEndian>()?
    };
    let actual_crc = crc32(body);
    if stored_crc != actual_crc {
        return Err(anyhow!(
            "crc mismatch (stored {:08x}, actual {:08x})",
            stored_crc,
            actual_crc
        ));
    }

    let mut cur = Cursor::new(body);
    let version = cur.read_u32::<LittleEndian>()?;
    if version != COL_VERSION {
        return Err(anyhow!(
            "unsupported version {} (expected {})",
            version,
            COL_VERSION
        ));
    }
    let column_count = cur.read_u32::<LittleEndian>()? as usize;
    let row_count = cur.read_u64::<LittleEndian>()? as usize;

    // Санитарные границы до аллокаций: заголовок колонки занимает
    // минимум 3 байта, значение в любой колонке — минимум 4.
    if column_count > body.len() / 3 {
        return Err(anyhow!(
            "implausible column_count {} for {} byte payload",
            column_count,
            body.len()
        ));
    }
    if column_count > 0 && row_count > body.len() / 4 {
        return Err(anyhow!(
            "implausible row_count {} for {} byte payload",
            row_count,
            body.len()
        ));
    }

    let mut columns = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        let name_len = cur.read_u16::<LittleEndian>()? as usize;
        let name = read_utf8(&mut cur, name_len, "column name")?;
        let ty = cur.read_u8()?;
        let data = match ty {
            COL_TYPE_I64 => {
                let mut vals = Vec::with_capacity(row_count);
                for _ in 0..row_count {
                    vals.push(cur.read_i64::<LittleEndian>()?);
                }
                ColumnData::I64(vals)
            }
            COL_TYPE_F64 => {
                let mut vals = Vec::with_capacity(row_count);
                for _ in 0..row_count {
                    vals.push(f64::from_bits(cur.read_u64::<LittleEndian>()?));
                }
                ColumnData::F64(vals)
            }
            COL_TYPE_STR => {
                let mut vals = Vec::with_capacity(row_count);
                for _ in 0..row_count {
                    let len = cur.read_u32::<LittleEndian>()? as usize;
                    vals.push(read_utf8(&mut cur, len, "string value")?);
                }
                ColumnData::Str(vals)
            }
            other => return Err(anyhow!("unknown column type tag {}", other)),
        };
        columns.push(Column { name, data });
    }

    if cur.position() as usize != body.len() {
        return Err(anyhow!(
            "trailing garbage: {} bytes past end of payload",
            body.len() - cur.position() as usize
        ));
    }

    Table::new(columns)
}

fn read_utf8(cur: &mut Cursor<&[u8]>, len: usize, what: &str) -> Result<String> {
    let remaining = cur.get_ref().len() - cur.position() as usize;
    if len > remaining {
        return Err(anyhow!(
            "{} length {} exceeds remaining {} bytes",
            what,
            len,
            remaining
        ));
    }
    let mut buf = vec![0u8; len];
    cur.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|_| anyhow!("{} is not valid UTF-8", what))
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut h = crc32fast::Hasher::new();
    h.update(bytes);
    h.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{records_to_table, Post};

    fn sample_table() -> Table {
        records_to_table(&[
            Post {
                id: 1,
                user_id: 10,
                title: "first".into(),
                body: "hello".into(),
            },
            Post {
                id: 2,
                user_id: 11,
                title: "второй".into(),
                body: "тело поста".into(),
            },
        ])
    }

    #[test]
    fn encode_decode_roundtrip() {
        let t0 = sample_table();
        let bytes = encode_table(&t0).unwrap();
        let t1 = decode_table(&bytes).unwrap();
        assert_eq!(t0, t1);
    }

    #[test]
    fn empty_table_roundtrip() {
        use crate::model::{Record, User};
        let t0 = Table::empty(User::SCHEMA);
        let bytes = encode_table(&t0).unwrap();
        let t1 = decode_table(&bytes).unwrap();
        assert_eq!(t1.rows(), 0);
        assert_eq!(t1.columns().len(), 4);
    }

    #[test]
    fn bad_magic_rejected() {
        let mut bytes = encode_table(&sample_table()).unwrap();
        bytes[0] = b'X';
        assert!(decode_table(&bytes).is_err());
    }

    #[test]
    fn flipped_byte_fails_crc() {
        let mut bytes = encode_table(&sample_table()).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        let err = decode_table(&bytes).unwrap_err();
        assert!(format!("{}", err).contains("crc"), "got: {}", err);
    }

    #[test]
    fn truncation_rejected() {
        let bytes = encode_table(&sample_table()).unwrap();
        let cut = &bytes[..bytes.len() - 9];
        assert!(decode_table(cut).is_err());
    }
}
